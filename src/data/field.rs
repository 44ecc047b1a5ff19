use crate::text::tokens::TokenBuilder;

/// Whether a value is present, or one of the CIF placeholder markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValuePresence {
    /// An ordinary value (including a quoted `'.'` or `'?'`).
    Present,
    /// The bare `.` marker (value not applicable).
    NotSpecified,
    /// The bare `?` marker (value unknown).
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
enum FieldRepr<'a> {
    /// Spans into the shared source buffer.
    Tokens {
        data: &'a str,
        tokens: TokenBuilder,
    },
    /// Values synthesized without a backing buffer.
    Strings(Vec<String>),
}

/// A column of values.
///
/// Single-row and multi-row fields share this representation; a field with
/// one row is just a column of length one. Values are decoded on access.
#[derive(Debug, Clone, PartialEq)]
pub struct CifField<'a> {
    repr: FieldRepr<'a>,
}

impl<'a> CifField<'a> {
    /// Field backed by spans into `data`.
    pub fn of_tokens(data: &'a str, tokens: TokenBuilder) -> Self {
        Self {
            repr: FieldRepr::Tokens { data, tokens },
        }
    }

    /// Field backed by owned strings.
    pub fn of_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            repr: FieldRepr::Strings(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of values in this field.
    pub fn row_count(&self) -> usize {
        match &self.repr {
            FieldRepr::Tokens { tokens, .. } => tokens.count(),
            FieldRepr::Strings(values) => values.len(),
        }
    }

    /// Raw value at `row`, or `""` when out of range.
    ///
    /// `.` and `?` are returned literally; see [`CifField::value_presence`].
    pub fn str(&self, row: usize) -> &str {
        match &self.repr {
            FieldRepr::Tokens { data, tokens } => tokens
                .span(row)
                .and_then(|(start, end)| data.get(start..end))
                .unwrap_or(""),
            FieldRepr::Strings(values) => values.get(row).map_or("", String::as_str),
        }
    }

    /// Byte span of the value at `row` in the source buffer.
    ///
    /// `None` for out-of-range rows and for fields built from owned strings.
    pub fn span(&self, row: usize) -> Option<(usize, usize)> {
        match &self.repr {
            FieldRepr::Tokens { tokens, .. } => tokens.span(row),
            FieldRepr::Strings(_) => None,
        }
    }

    /// Whether the value at `row` was quoted or given as a text field.
    pub fn is_escaped(&self, row: usize) -> bool {
        match &self.repr {
            FieldRepr::Tokens { tokens, .. } => tokens.is_escaped(row),
            FieldRepr::Strings(_) => false,
        }
    }

    /// Tell a bare `.`/`?` marker apart from an ordinary value.
    pub fn value_presence(&self, row: usize) -> ValuePresence {
        if self.is_escaped(row) {
            return ValuePresence::Present;
        }
        match self.str(row) {
            "." => ValuePresence::NotSpecified,
            "?" => ValuePresence::Unknown,
            _ => ValuePresence::Present,
        }
    }

    /// Value at `row` parsed as an integer.
    pub fn int(&self, row: usize) -> Option<i64> {
        self.str(row).parse().ok()
    }

    /// Value at `row` parsed as a float, ignoring a `(su)` uncertainty suffix.
    pub fn float(&self, row: usize) -> Option<f64> {
        let s = self.str(row);
        let s = match s.find('(') {
            Some(idx) => &s[..idx],
            None => s,
        };
        s.parse().ok()
    }

    /// Iterate over all raw values in row order.
    pub fn iter(&self) -> FieldIter<'_, 'a> {
        FieldIter {
            field: self,
            row: 0,
        }
    }

    /// Decode all values into owned strings.
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

/// Iterator over the raw values of a [`CifField`].
pub struct FieldIter<'f, 'a> {
    field: &'f CifField<'a>,
    row: usize,
}

impl<'f, 'a> Iterator for FieldIter<'f, 'a> {
    type Item = &'f str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.field.row_count() {
            return None;
        }
        let value = self.field.str(self.row);
        self.row += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.field.row_count() - self.row;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FieldIter<'_, '_> {}

impl<'f, 'a> IntoIterator for &'f CifField<'a> {
    type Item = &'f str;
    type IntoIter = FieldIter<'f, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
