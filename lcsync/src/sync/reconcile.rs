use std::io::{self, BufRead, Write};

use super::index::LocalIndex;
use super::paths::difficulty_folder;
use super::submission::EnrichedSubmission;
use lcsync_core::Difficulty;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub new: Vec<EnrichedSubmission>,
    pub duplicates: Vec<EnrichedSubmission>,
}

/// Splits fetched submissions by whether their title slug is already on
/// disk. Order within each list follows the input.
pub fn classify(submissions: Vec<EnrichedSubmission>, index: &LocalIndex) -> Classified {
    let (duplicates, new) = submissions
        .into_iter()
        .partition(|submission| index.contains(&submission.title_slug));
    Classified { new, duplicates }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Keep what is on disk.
    Ignore,
    /// Replace on-disk content with the fetched code.
    Overwrite,
}

impl ConflictResolution {
    /// The duplicates that proceed to the writer.
    pub fn accepted(self, duplicates: Vec<EnrichedSubmission>) -> Vec<EnrichedSubmission> {
        match self {
            ConflictResolution::Ignore => Vec::new(),
            ConflictResolution::Overwrite => duplicates,
        }
    }
}

/// Decides once per run what happens to the whole duplicate set.
pub trait ConflictPolicy {
    fn resolve(&mut self, duplicates: &[EnrichedSubmission]) -> ConflictResolution;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IgnorePolicy;

impl ConflictPolicy for IgnorePolicy {
    fn resolve(&mut self, _duplicates: &[EnrichedSubmission]) -> ConflictResolution {
        ConflictResolution::Ignore
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OverwritePolicy;

impl ConflictPolicy for OverwritePolicy {
    fn resolve(&mut self, _duplicates: &[EnrichedSubmission]) -> ConflictResolution {
        ConflictResolution::Overwrite
    }
}

/// Asks on a console. Empty input means overwrite; end of input or a
/// broken terminal means ignore.
pub struct PromptPolicy<R, W> {
    input: R,
    output: W,
}

impl PromptPolicy<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptPolicy<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, duplicates: &[EnrichedSubmission]) -> io::Result<ConflictResolution> {
        writeln!(self.output)?;
        writeln!(self.output, "{} files are duplicates:", duplicates.len())?;
        for (i, submission) in duplicates.iter().enumerate() {
            writeln!(
                self.output,
                "  {}. {} ({}) - {}",
                i + 1,
                submission.display_title(),
                submission.lang,
                difficulty_display(submission.difficulty),
            )?;
        }
        writeln!(self.output)?;
        writeln!(self.output, "i = Ignore (keep old code)")?;
        writeln!(self.output, "w = Overwrite (replace old code)")?;
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Warning: if your approach changed, Ignore will not update it; Overwrite replaces the previous approach."
        )?;

        loop {
            write!(self.output, "Choose action [i/w] (w): ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(ConflictResolution::Ignore);
            }
            match line.trim().to_ascii_lowercase().as_str() {
                "" | "w" => return Ok(ConflictResolution::Overwrite),
                "i" => return Ok(ConflictResolution::Ignore),
                other => writeln!(self.output, "Error: {other:?} is not one of i, w.")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> ConflictPolicy for PromptPolicy<R, W> {
    fn resolve(&mut self, duplicates: &[EnrichedSubmission]) -> ConflictResolution {
        self.ask(duplicates).unwrap_or(ConflictResolution::Ignore)
    }
}

fn difficulty_display(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Unknown => "unknown",
        known => difficulty_folder(known),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn submission(slug: &str, lang: &str) -> EnrichedSubmission {
        EnrichedSubmission {
            id: format!("{slug}-{lang}"),
            title: slug.replace('-', " "),
            title_slug: slug.into(),
            lang: lang.into(),
            difficulty: Difficulty::Easy,
            code: "code".into(),
            ..EnrichedSubmission::default()
        }
    }

    fn prompt(input: &str) -> PromptPolicy<Cursor<Vec<u8>>, Vec<u8>> {
        PromptPolicy::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn classify_splits_by_slug_and_keeps_order() {
        let index: LocalIndex = ["two-sum".to_string()].into_iter().collect();
        let classified = classify(
            vec![
                submission("add-two-numbers", "rust"),
                submission("two-sum", "python3"),
                submission("valid-parentheses", "java"),
                submission("two-sum", "java"),
            ],
            &index,
        );

        let new: Vec<_> = classified.new.iter().map(|s| s.id.as_str()).collect();
        let dup: Vec<_> = classified.duplicates.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(new, vec!["add-two-numbers-rust", "valid-parentheses-java"]);
        assert_eq!(dup, vec!["two-sum-python3", "two-sum-java"]);
    }

    #[test]
    fn builtin_policies_apply_to_whole_set() {
        let dups = vec![submission("two-sum", "rust"), submission("lru-cache", "rust")];
        assert!(IgnorePolicy.resolve(&dups).accepted(dups.clone()).is_empty());
        assert_eq!(OverwritePolicy.resolve(&dups).accepted(dups.clone()), dups);
    }

    #[test]
    fn prompt_defaults_to_overwrite_on_empty_answer() {
        let mut policy = prompt("\n");
        let dups = vec![submission("two-sum", "python3")];
        assert_eq!(policy.resolve(&dups), ConflictResolution::Overwrite);

        let output = String::from_utf8(policy.into_output()).unwrap();
        assert!(output.contains("1 files are duplicates:"));
        assert!(output.contains("  1. two sum (python3) - easy"));
    }

    #[test]
    fn prompt_reasks_until_valid_choice() {
        let mut policy = prompt("maybe\nI\n");
        let dups = vec![submission("two-sum", "python3")];
        assert_eq!(policy.resolve(&dups), ConflictResolution::Ignore);

        let output = String::from_utf8(policy.into_output()).unwrap();
        assert_eq!(output.matches("Choose action").count(), 2);
    }

    #[test]
    fn prompt_end_of_input_ignores() {
        let mut policy = prompt("");
        let dups = vec![submission("two-sum", "python3")];
        assert_eq!(policy.resolve(&dups), ConflictResolution::Ignore);
    }
}
