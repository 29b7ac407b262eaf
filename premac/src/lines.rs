//! Physical-line assembly: backslash continuations and comment stripping.
//!
//! Comment markers are matched lexically, without regard to string literals.

/// Per-file assembly state: the accumulated text of backslash-continued
/// lines, and whether a `/* ... */` comment is open across lines.
pub(crate) struct LineAssembler {
    pending: Option<String>,
    in_comment: bool,
}

impl LineAssembler {
    pub(crate) fn new() -> Self {
        LineAssembler {
            pending: None,
            in_comment: false,
        }
    }

    /// Feed one physical line, terminator included. Returns the assembled
    /// logical line, or `None` while a continuation is still pending.
    pub(crate) fn join(&mut self, line: &str) -> Option<String> {
        let mut text = match self.pending.take() {
            Some(mut prior) => {
                prior.push_str(line);
                prior
            }
            None => line.to_string(),
        };
        for ending in ["\\\r\n", "\\\n"] {
            if text.ends_with(ending) {
                text.truncate(text.len() - ending.len());
                self.pending = Some(text);
                return None;
            }
        }
        Some(text)
    }

    /// Take the continuation text still pending at end of file, if any.
    pub(crate) fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }

    /// Whether a block comment is still open.
    pub(crate) fn in_comment(&self) -> bool {
        self.in_comment
    }

    /// Remove `//` and `/* ... */` comments from a logical line, carrying
    /// block-comment state across calls. A line swallowed whole by a block
    /// comment comes back empty.
    pub(crate) fn strip_comments(&mut self, text: &str) -> String {
        let mut line;
        let mut comment;
        if self.in_comment {
            line = String::new();
            comment = text.to_string();
        } else {
            line = text.to_string();
            comment = String::new();
            if let Some(idx) = line.find("//") {
                let ending = terminator(&line).to_string();
                line.truncate(idx);
                line.push_str(&ending);
            }
        }
        // alternate between looking for the end and the start of a block
        // comment until neither is present
        loop {
            if self.in_comment {
                match comment.find("*/") {
                    Some(idx) => {
                        line.push_str(&comment[idx + 2..]);
                        self.in_comment = false;
                    }
                    None => break,
                }
            } else {
                match line.find("/*") {
                    Some(idx) => {
                        comment = line[idx + 2..].to_string();
                        line.truncate(idx);
                        self.in_comment = true;
                    }
                    None => break,
                }
            }
        }
        line
    }
}

/// The line terminator at the end of `s`, if any.
fn terminator(s: &str) -> &str {
    if s.ends_with("\r\n") {
        "\r\n"
    } else if s.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_continued_lines() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.join("a \\\n"), None);
        assert_eq!(asm.join("b \\\n"), None);
        assert_eq!(asm.join("c\n").as_deref(), Some("a b c\n"));
        assert_eq!(asm.join("plain\n").as_deref(), Some("plain\n"));
    }

    #[test]
    fn crlf_continuations() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.join("a\\\r\n"), None);
        assert_eq!(asm.join("b\r\n").as_deref(), Some("ab\r\n"));
    }

    #[test]
    fn pending_text_is_recoverable_at_eof() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.join("tail \\\n"), None);
        assert_eq!(asm.take_pending().as_deref(), Some("tail "));
        assert_eq!(asm.take_pending(), None);
    }

    #[test]
    fn strips_line_comments() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.strip_comments("x = 1; // note\n"), "x = 1; \n");
        assert_eq!(asm.strip_comments("// whole line\n"), "\n");
    }

    #[test]
    fn strips_block_comments_within_a_line() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.strip_comments("a /* b */ c\n"), "a  c\n");
        assert_eq!(asm.strip_comments("a /* b */ c /* d */ e\n"), "a  c  e\n");
        assert!(!asm.in_comment());
    }

    #[test]
    fn block_comments_cross_lines() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.strip_comments("code /* start\n"), "code ");
        assert!(asm.in_comment());
        assert_eq!(asm.strip_comments("middle\n"), "");
        assert_eq!(asm.strip_comments("end */ tail\n"), " tail\n");
        assert!(!asm.in_comment());
    }

    #[test]
    fn line_comment_ignored_inside_block_comment() {
        let mut asm = LineAssembler::new();
        asm.strip_comments("/* open\n");
        assert_eq!(asm.strip_comments("still // not a cut */ out\n"), " out\n");
        assert!(!asm.in_comment());
    }
}
