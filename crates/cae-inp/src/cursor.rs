use crate::is_comment;

/// Forward-only cursor over the lines of a deck.
///
/// Section readers take `&mut LineCursor` and consume payload lines until
/// the next `*` keyword; the keyword line itself is left for the caller.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the next unread line.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// 1-based number of the most recently consumed line.
    pub fn line_number(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    pub fn advance(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }

    /// True when the next meaningful line opens a new keyword, or at end of
    /// input. Blank and `**` comment lines are looked through.
    pub fn at_section_boundary(&self) -> bool {
        self.lines[self.pos.min(self.lines.len())..]
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty() && !is_comment(l))
            .is_none_or(|l| l.starts_with('*'))
    }

    /// Consumes and returns the next payload line of the current section
    /// together with its 1-based line number. Returns `None` without
    /// consuming the keyword line that ends the section.
    pub fn next_payload(&mut self) -> Option<(usize, &'a str)> {
        loop {
            let trimmed = self.peek()?.trim();
            if trimmed.is_empty() || is_comment(trimmed) {
                self.pos += 1;
                continue;
            }
            if trimmed.starts_with('*') {
                return None;
            }
            self.pos += 1;
            return Some((self.pos, trimmed));
        }
    }

    /// Drops the payload of the current section.
    pub fn skip_section(&mut self) -> usize {
        let mut skipped = 0;
        while self.next_payload().is_some() {
            skipped += 1;
        }
        skipped
    }
}
