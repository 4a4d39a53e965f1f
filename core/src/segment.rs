//! Maximal-munch segment substitution.
//!
//! One pass over the input: at each position the longest matching lexicon
//! key is replaced and the scan advances by the key length; when nothing
//! matches, the single code point is copied unchanged and the scan advances
//! by one. Matches are therefore non-overlapping and chosen left to right,
//! and a pass always terminates after exactly `input.chars().count()`
//! advancement steps, whatever the lexicon contains.

use std::sync::Arc;

use crate::lexicon::Lexicon;

/// Apply a single lexicon over `input`.
///
/// # Example
/// ```
/// use libzhconv_core::{segment, Lexicon};
///
/// let lex = Lexicon::from_text("demo", "汉\t漢\n汉字\t漢字\n").unwrap();
/// assert_eq!(segment::apply(&lex, "汉字abc"), "漢字abc");
/// ```
pub fn apply(lexicon: &Lexicon, input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    while pos < chars.len() {
        match lexicon.lookup_longest(&chars, pos) {
            Some((len, replacement)) => {
                out.push_str(replacement);
                pos += len;
            }
            None => {
                out.push(chars[pos]);
                pos += 1;
            }
        }
    }
    out
}

/// Apply a group of lexicons matched together as one pass.
///
/// At each position every member is consulted and the longest match across
/// the group wins; on equal lengths the earlier member takes precedence,
/// which is how grouped dictionaries shadow each other.
pub fn apply_group(dicts: &[Arc<Lexicon>], input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    while pos < chars.len() {
        let mut best: Option<(usize, &str)> = None;
        for dict in dicts {
            if let Some((len, replacement)) = dict.lookup_longest(&chars, pos) {
                match best {
                    Some((best_len, _)) if best_len >= len => {}
                    _ => best = Some((len, replacement)),
                }
            }
        }
        match best {
            Some((len, replacement)) => {
                out.push_str(replacement);
                pos += len;
            }
            None => {
                out.push(chars[pos]);
                pos += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Lexicon {
        Lexicon::from_text("t", src).unwrap()
    }

    #[test]
    fn test_longest_match_precedence() {
        let l = lex("中文\tX\n中\tY\n");
        assert_eq!(apply(&l, "中文"), "X");
        assert_eq!(apply(&l, "中午"), "Y午");
    }

    #[test]
    fn test_unmapped_passthrough() {
        let l = lex("汉\t漢\n");
        assert_eq!(apply(&l, "abc 123 你好"), "abc 123 你好");
    }

    #[test]
    fn test_empty_input() {
        let l = lex("汉\t漢\n");
        assert_eq!(apply(&l, ""), "");
    }

    #[test]
    fn test_empty_replacement_deletes() {
        let l = lex("的\t\n");
        assert_eq!(apply(&l, "我的书"), "我书");
    }

    #[test]
    fn test_replacement_longer_than_key() {
        let l = lex("干\t乾燥\n");
        assert_eq!(apply(&l, "干干"), "乾燥乾燥");
    }

    #[test]
    fn test_group_longest_across_members() {
        let phrases = Arc::new(lex("简体\t簡體\n"));
        let chars = Arc::new(lex("简\t簡\n体\t體\n中\t中\n"));
        let out = apply_group(&[phrases, chars], "简体中");
        assert_eq!(out, "簡體中");
    }

    #[test]
    fn test_group_earlier_member_wins_ties() {
        let a = Arc::new(lex("汉\tA\n"));
        let b = Arc::new(lex("汉\tB\n"));
        assert_eq!(apply_group(&[a.clone(), b.clone()], "汉"), "A");
        assert_eq!(apply_group(&[b, a], "汉"), "B");
    }

    #[test]
    fn test_group_longer_match_beats_earlier_member() {
        let a = Arc::new(lex("汉\tA\n"));
        let b = Arc::new(lex("汉字\tB\n"));
        assert_eq!(apply_group(&[a, b], "汉字"), "B");
    }
}
