//! Prompt assembly for recommendation requests.

use std::fmt::Write;

use super::catalog::Song;

/// One context entry per retrieved song.
pub fn format_context(songs: &[&Song]) -> String {
    let mut context = String::new();
    for song in songs {
        let _ = writeln!(
            context,
            "- Genre: {}, Artist: {}, Title: {}\n  Description: {}",
            song.genre, song.artist, song.song_title, song.description
        );
    }
    context
}

/// Full prompt sent to the model.
pub fn build_prompt(query: &str, songs: &[&Song]) -> String {
    let context = format_context(songs);
    format!(
        "You are a music expert who recommends songs that fit the user's mood or situation.\n\
         Using the retrieved song information below, recommend the most suitable songs for the user's question.\n\
         For each recommendation, briefly explain why you chose it.\n\
         \n\
         [User question]\n\
         {query}\n\
         \n\
         [Retrieved songs]\n\
         {context}\n\
         [Answer]\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str) -> Song {
        Song {
            genre: "Ambient".into(),
            artist: "Brian Eno".into(),
            song_title: title.into(),
            description: "Slow, spacious textures".into(),
        }
    }

    #[test]
    fn test_context_lines() {
        let a = song("An Ending (Ascent)");
        let ctx = format_context(&[&a]);
        assert_eq!(
            ctx,
            "- Genre: Ambient, Artist: Brian Eno, Title: An Ending (Ascent)\n  Description: Slow, spacious textures\n"
        );
    }

    #[test]
    fn test_prompt_contains_question_and_every_song() {
        let a = song("1/1");
        let b = song("2/1");
        let prompt = build_prompt("Something calm for studying", &[&a, &b]);

        assert!(prompt.contains("[User question]\nSomething calm for studying\n"));
        assert!(prompt.contains("Title: 1/1"));
        assert!(prompt.contains("Title: 2/1"));
        assert!(prompt.trim_end().ends_with("[Answer]"));
    }
}
