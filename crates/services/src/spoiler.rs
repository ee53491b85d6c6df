//! # Spoiler Parser
//!
//! Splits a post body into plain and spoiler segments. Spoilers are
//! delimited `||like this||`, non-overlapping and non-nested; everything
//! outside a pair keeps its original substring boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

use domains::Post;

static SPOILER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|\|(.*?)\|\|").expect("spoiler pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub is_spoiler: bool,
}

/// Scan left to right for delimiter pairs. Empty input yields no segments;
/// input without delimiters yields a single plain segment.
pub fn parse(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in SPOILER.captures_iter(content) {
        let whole = caps.get(0).expect("group 0 always present");
        let inner = caps.get(1).expect("group 1 always present");
        if whole.start() > cursor {
            segments.push(Segment {
                text: content[cursor..whole.start()].to_string(),
                is_spoiler: false,
            });
        }
        segments.push(Segment {
            text: inner.as_str().to_string(),
            is_spoiler: true,
        });
        cursor = whole.end();
    }

    if cursor < content.len() {
        segments.push(Segment {
            text: content[cursor..].to_string(),
            is_spoiler: false,
        });
    }
    segments
}

/// Inverse of [`parse`]: re-wraps spoiler segments in their delimiters and
/// concatenates. `reassemble(&parse(s)) == s` for every input.
pub fn reassemble(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| {
            if segment.is_spoiler {
                format!("||{}||", segment.text)
            } else {
                segment.text.clone()
            }
        })
        .collect()
}

/// Reveal state for one rendered post body. Per-segment state is keyed by
/// segment index and resets whenever the underlying post changes.
pub struct SpoilerView {
    post_id: String,
    content: String,
    segments: Vec<Segment>,
    revealed: Vec<bool>,
}

impl SpoilerView {
    pub fn new(post: &Post) -> Self {
        let segments = parse(&post.content);
        let revealed = vec![false; segments.len()];
        Self {
            post_id: post.id.clone(),
            content: post.content.clone(),
            segments,
            revealed,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(state) = self.revealed.get_mut(index) {
            *state = !*state;
        }
    }

    pub fn expand_all(&mut self) {
        self.revealed.fill(true);
    }

    pub fn collapse_all(&mut self) {
        self.revealed.fill(false);
    }

    /// Re-point the view at a post, resetting reveal state if the identity
    /// or the body changed.
    pub fn sync(&mut self, post: &Post) {
        if self.post_id == post.id && self.content == post.content {
            return;
        }
        *self = Self::new(post);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domains::{Role, User};

    fn segment(text: &str, is_spoiler: bool) -> Segment {
        Segment {
            text: text.to_string(),
            is_spoiler,
        }
    }

    #[test]
    fn splits_around_delimiter_pairs() {
        assert_eq!(
            parse("a ||b|| c"),
            vec![segment("a ", false), segment("b", true), segment(" c", false)]
        );
    }

    #[test]
    fn no_delimiters_is_one_plain_segment() {
        assert_eq!(parse("plain text"), vec![segment("plain text", false)]);
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn unmatched_trailing_delimiters_stay_plain() {
        assert_eq!(
            parse("start ||hidden|| tail ||open"),
            vec![
                segment("start ", false),
                segment("hidden", true),
                segment(" tail ||open", false),
            ]
        );
    }

    #[test]
    fn adjacent_pairs_do_not_nest() {
        assert_eq!(
            parse("||a||||b||"),
            vec![segment("a", true), segment("b", true)]
        );
    }

    #[test]
    fn round_trip_reconstructs_the_input() {
        for input in [
            "a ||b|| c",
            "||only spoiler||",
            "no spoilers at all",
            "||a||||b|| mid ||c|| end",
            "dangling ||half",
            "",
        ] {
            assert_eq!(reassemble(&parse(input)), input);
        }
    }

    fn post(id: &str, content: &str) -> Post {
        Post {
            id: id.to_string(),
            title: None,
            content: content.to_string(),
            author: User {
                id: "a".to_string(),
                username: "author".to_string(),
                email: String::new(),
                role: Role::User,
            },
            timestamp: Utc.timestamp_millis_opt(0).unwrap(),
            likes: vec![],
            tags: vec![],
            mood: String::new(),
            team: String::new(),
            flags: vec![],
            deleted: false,
            flagged: false,
            comments: vec![],
        }
    }

    #[test]
    fn reveal_state_is_per_segment_and_resets_on_post_change() {
        let first = post("1", "x ||a|| y ||b||");
        let mut view = SpoilerView::new(&first);

        view.toggle(1);
        assert!(view.is_revealed(1));
        assert!(!view.is_revealed(3));

        // Same post, same body: state survives.
        view.sync(&first);
        assert!(view.is_revealed(1));

        // Different post: state resets.
        view.sync(&post("2", "x ||a|| y ||b||"));
        assert!(!view.is_revealed(1));
    }

    #[test]
    fn expand_and_collapse_all_are_uniform() {
        let mut view = SpoilerView::new(&post("1", "||a|| mid ||b||"));
        view.expand_all();
        assert!(view.is_revealed(0) && view.is_revealed(2));
        view.collapse_all();
        assert!(!view.is_revealed(0) && !view.is_revealed(2));
    }
}
