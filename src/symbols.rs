use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// The closed groups every input symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolCategory {
    Character,
    Digit,
    Keyword,
    Delimiter,
    Operator,
    DataStructure,
    Comment,
}

/// A static, bidirectional map between internal names and the emoji that
/// spell them.
///
/// `entries` is the canonical name → symbol direction; the inverse is built
/// on first use and shared for the rest of the process.
pub struct SymbolTable {
    category: SymbolCategory,
    entries: &'static [(&'static str, &'static str)],
    inverse: OnceCell<HashMap<&'static str, &'static str>>,
}

impl SymbolTable {
    const fn new(
        category: SymbolCategory,
        entries: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            category,
            entries,
            inverse: OnceCell::new(),
        }
    }

    pub fn category(&self) -> SymbolCategory {
        self.category
    }

    /// Name → symbol pairs in declaration order.
    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }

    pub fn symbol(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(entry_name, _)| *entry_name == name)
            .map(|(_, symbol)| *symbol)
    }

    pub fn name(&self, symbol: &str) -> Option<&'static str> {
        self.inverse().get(symbol).copied()
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.inverse().contains_key(segment)
    }

    fn inverse(&self) -> &HashMap<&'static str, &'static str> {
        self.inverse.get_or_init(|| {
            self.entries
                .iter()
                .map(|&(name, symbol)| (symbol, name))
                .collect()
        })
    }
}

pub static CHARACTERS: SymbolTable = SymbolTable::new(
    SymbolCategory::Character,
    &[
        ("A", "🅰️"),
        ("B", "🅱️"),
        ("C", "©️"),
        ("M", "Ⓜ️"),
        ("O", "🅾️"),
        ("R", "®️"),
        ("P", "🅿️"),
        ("I", "ℹ️"),
        ("H", "♓"),
        ("S", "💲"),
        ("AB", "🆎"),
        ("CL", "🆑"),
        ("COOL", "🆒"),
        ("FREE", "🆓"),
        ("ZZZ", "💤"),
        ("ID", "🆔"),
        ("NEW", "🆕"),
        ("NG", "🆖"),
        ("OK", "🆗"),
        ("SOS", "🆘"),
        ("UP", "🆙"),
        ("VS", "🆚"),
        ("abc", "🔤"),
        ("abcd", "🔡"),
        ("ABCD", "🔠"),
    ],
);

pub static DIGITS: SymbolTable = SymbolTable::new(
    SymbolCategory::Digit,
    &[
        ("0", "0️⃣"),
        ("1", "1️⃣"),
        ("2", "2️⃣"),
        ("3", "3️⃣"),
        ("4", "4️⃣"),
        ("5", "5️⃣"),
        ("6", "6️⃣"),
        ("7", "7️⃣"),
        ("8", "🎱"),
        ("9", "9️⃣"),
    ],
);

pub static KEYWORDS: SymbolTable = SymbolTable::new(
    SymbolCategory::Keyword,
    &[
        ("TRUE", "✅"),
        ("FALSE", "❌"),
        ("LET", "📝"),
        ("IF", "🤔"),
        ("ELSE", "⤵️"),
        ("FUNCTION", "🔧"),
        ("WHILE", "🔄"),
        ("FOR", "🔁"),
        ("BREAK", "⏹️"),
        ("CONTINUE", "▶️"),
        ("RETURN", "🔙"),
    ],
);

pub static DELIMITERS: SymbolTable = SymbolTable::new(
    SymbolCategory::Delimiter,
    &[
        ("DECIMAL_SEPARATOR", "⏺️"),
        ("ARGUMENT_SEPARATOR", "🔸"),
        ("END_OF_LINE", "🚀"),
        ("BLOCK_START", "🌅"),
        ("BLOCK_END", "🌇"),
        ("CALL_START", "📭"),
        ("CALL_END", "📬"),
    ],
);

pub static OPERATORS: SymbolTable = SymbolTable::new(
    SymbolCategory::Operator,
    &[
        ("PLUS", "➕"),
        ("MINUS", "➖"),
        ("TIMES", "✖️"),
        ("DIVISION", "➗"),
        ("BANG", "❗"),
        ("AND", "🔺"),
        ("OR", "🔻"),
        ("EQ", "⚖️"),
        ("GT", "🔼"),
        ("LT", "🔽"),
        ("ASSIGN", "➡️"),
        ("LOOKUP", "🔍"),
    ],
);

pub static DATA_STRUCTURES: SymbolTable = SymbolTable::new(
    SymbolCategory::DataStructure,
    &[("LIST", "📋"), ("HASH", "📦"), ("KEY", "🔑")],
);

pub static COMMENTS: SymbolTable =
    SymbolTable::new(SymbolCategory::Comment, &[("COMMENT", "💬")]);

pub const DECIMAL_SEPARATOR: &str = "⏺️";

/// Every table, for validation and lookups that span categories.
pub fn all_tables() -> [&'static SymbolTable; 7] {
    [
        &CHARACTERS,
        &DIGITS,
        &KEYWORDS,
        &DELIMITERS,
        &OPERATORS,
        &DATA_STRUCTURES,
        &COMMENTS,
    ]
}

/// Sections in the order the host keyboard renders them.
pub fn keyboard_sections() -> [(&'static str, &'static SymbolTable); 7] {
    [
        ("comments", &COMMENTS),
        ("operators", &OPERATORS),
        ("numbers", &DIGITS),
        ("characters", &CHARACTERS),
        ("delimiters", &DELIMITERS),
        ("keywords", &KEYWORDS),
        ("datastructures", &DATA_STRUCTURES),
    ]
}

pub fn is_character(segment: &str) -> bool {
    CHARACTERS.contains(segment)
}

pub fn is_digit(segment: &str) -> bool {
    DIGITS.contains(segment)
}

pub fn is_keyword(segment: &str) -> bool {
    KEYWORDS.contains(segment)
}

pub fn is_delimiter(segment: &str) -> bool {
    DELIMITERS.contains(segment)
}

pub fn is_operator(segment: &str) -> bool {
    OPERATORS.contains(segment)
}

pub fn is_data_structure(segment: &str) -> bool {
    DATA_STRUCTURES.contains(segment)
}

pub fn is_comment(segment: &str) -> bool {
    COMMENTS.contains(segment)
}

pub fn is_decimal_separator(segment: &str) -> bool {
    segment == DECIMAL_SEPARATOR
}
