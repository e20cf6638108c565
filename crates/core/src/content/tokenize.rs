//! Sentence tokenizer producing the narration units of a node.

const ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "st.", "jr.", "sr.", "vs.", "etc.", "e.g.", "i.e.", "approx.",
];

const TERMINATORS: &[char] = &['.', '!', '?', '…'];
const CLOSERS: &[char] = &['"', '\'', ')', ']', '”', '’', '»'];

/// Splits sanitized text into sentences.
///
/// Every line is split independently, so a line break always ends a unit.
/// Blank units are dropped; unterminated trailing text becomes its own unit.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() {
            split_line(line, &mut sentences);
        }
    }
    sentences
}

fn split_line(line: &str, out: &mut Vec<String>) {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (_, c) = chars[i];
        if !TERMINATORS.contains(&c) {
            i += 1;
            continue;
        }

        let run_start = i;
        let mut j = i + 1;
        while j < chars.len() && TERMINATORS.contains(&chars[j].1) {
            j += 1;
        }
        while j < chars.len() && CLOSERS.contains(&chars[j].1) {
            j += 1;
        }

        let at_boundary = j == chars.len() || chars[j].1.is_whitespace();
        let single_period = c == '.' && j - run_start == 1;

        if at_boundary && !(single_period && is_abbreviation(line, start, chars[run_start].0)) {
            let end = if j == chars.len() {
                line.len()
            } else {
                chars[j].0
            };
            push_unit(&line[start..end], out);
            start = end;
        }
        i = j;
    }

    if start < line.len() {
        push_unit(&line[start..], out);
    }
}

/// Whether the word ending with the period at `period_at` is an
/// abbreviation or an initial rather than the end of a sentence.
fn is_abbreviation(line: &str, sentence_start: usize, period_at: usize) -> bool {
    let before = &line[sentence_start..period_at];
    let word_start = before
        .rfind(char::is_whitespace)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    let word = &before[word_start..];
    if word.is_empty() {
        return false;
    }

    let mut candidate = word.to_lowercase();
    candidate.push('.');
    let candidate = candidate.trim_start_matches(|c: char| CLOSERS.contains(&c) || c == '(');
    if ABBREVIATIONS.contains(&candidate) {
        return true;
    }

    let mut letters = word.chars();
    matches!(
        (letters.next(), letters.next()),
        (Some(c), None) if c.is_alphabetic() && c.is_uppercase()
    )
}

fn push_unit(raw: &str, out: &mut Vec<String>) {
    let unit = raw.trim();
    if !unit.is_empty() {
        out.push(unit.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_sentences() {
        assert_eq!(split_sentences("One. Two."), vec!["One.", "Two."]);
    }

    #[test]
    fn test_mixed_terminators_and_closers() {
        assert_eq!(
            split_sentences("Really?! He said \"no.\" Then left"),
            vec!["Really?!", "He said \"no.\"", "Then left"]
        );
    }

    #[test]
    fn test_abbreviations_and_initials() {
        assert_eq!(
            split_sentences("Dr. Smith met J. R. Doe, e.g. at work. Done."),
            vec!["Dr. Smith met J. R. Doe, e.g. at work.", "Done."]
        );
    }

    #[test]
    fn test_decimal_numbers_do_not_split() {
        assert_eq!(split_sentences("It cost 3.50 dollars."), vec!["It cost 3.50 dollars."]);
    }

    #[test]
    fn test_line_breaks_end_units() {
        assert_eq!(
            split_sentences("first line without stop\n\nsecond. third"),
            vec!["first line without stop", "second.", "third"]
        );
    }

    #[test]
    fn test_ellipsis_run() {
        assert_eq!(split_sentences("Wait... what?"), vec!["Wait...", "what?"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("   \n ").is_empty());
    }
}
