//! Core data models used throughout Lectern.
//!
//! The canonical book list is fixed at compile time. Its order is
//! meaningful: it drives search iteration and Old/New Testament scope
//! classification (the first 39 entries are the Old Testament).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DocumentError, UnknownBook};

/// Number of canonical books.
pub const BOOK_COUNT: usize = 66;

/// Number of Old Testament books at the head of the canonical order.
pub const OLD_TESTAMENT_LEN: usize = 39;

/// `(canonical name, display title)` in canonical order.
const CANONICAL_BOOKS: [(&str, &str); BOOK_COUNT] = [
    ("genesis", "Genesis"),
    ("exodus", "Exodus"),
    ("leviticus", "Leviticus"),
    ("numbers", "Numbers"),
    ("deuteronomy", "Deuteronomy"),
    ("joshua", "Joshua"),
    ("judges", "Judges"),
    ("ruth", "Ruth"),
    ("1samuel", "1 Samuel"),
    ("2samuel", "2 Samuel"),
    ("1kings", "1 Kings"),
    ("2kings", "2 Kings"),
    ("1chronicles", "1 Chronicles"),
    ("2chronicles", "2 Chronicles"),
    ("ezra", "Ezra"),
    ("nehemiah", "Nehemiah"),
    ("esther", "Esther"),
    ("job", "Job"),
    ("psalms", "Psalms"),
    ("proverbs", "Proverbs"),
    ("ecclesiastes", "Ecclesiastes"),
    ("songofsolomon", "Song of Solomon"),
    ("isaiah", "Isaiah"),
    ("jeremiah", "Jeremiah"),
    ("lamentations", "Lamentations"),
    ("ezekiel", "Ezekiel"),
    ("daniel", "Daniel"),
    ("hosea", "Hosea"),
    ("joel", "Joel"),
    ("amos", "Amos"),
    ("obadiah", "Obadiah"),
    ("jonah", "Jonah"),
    ("micah", "Micah"),
    ("nahum", "Nahum"),
    ("habakkuk", "Habakkuk"),
    ("zephaniah", "Zephaniah"),
    ("haggai", "Haggai"),
    ("zechariah", "Zechariah"),
    ("malachi", "Malachi"),
    ("matthew", "Matthew"),
    ("mark", "Mark"),
    ("luke", "Luke"),
    ("john", "John"),
    ("acts", "Acts"),
    ("romans", "Romans"),
    ("1corinthians", "1 Corinthians"),
    ("2corinthians", "2 Corinthians"),
    ("galatians", "Galatians"),
    ("ephesians", "Ephesians"),
    ("philippians", "Philippians"),
    ("colossians", "Colossians"),
    ("1thessalonians", "1 Thessalonians"),
    ("2thessalonians", "2 Thessalonians"),
    ("1timothy", "1 Timothy"),
    ("2timothy", "2 Timothy"),
    ("titus", "Titus"),
    ("philemon", "Philemon"),
    ("hebrews", "Hebrews"),
    ("james", "James"),
    ("1peter", "1 Peter"),
    ("2peter", "2 Peter"),
    ("1john", "1 John"),
    ("2john", "2 John"),
    ("3john", "3 John"),
    ("jude", "Jude"),
    ("revelation", "Revelation"),
];

/// Chapter number within a book. Always positive; not necessarily contiguous.
pub type ChapterNumber = u32;

/// Verse number within a chapter. Always positive.
pub type VerseNumber = u32;

/// The verses of one chapter, ascending by verse number.
pub type Chapter = BTreeMap<VerseNumber, String>;

/// Canonical identifier for one of the fixed corpus books.
///
/// Ordering follows the canonical sequence, so sorting `BookId`s yields
/// Genesis first and Revelation last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(u8);

impl BookId {
    /// Every book in canonical order.
    pub fn all() -> impl DoubleEndedIterator<Item = BookId> + ExactSizeIterator {
        (0..BOOK_COUNT as u8).map(BookId)
    }

    /// The book at position `index` of the canonical order.
    pub fn from_index(index: usize) -> Option<BookId> {
        (index < BOOK_COUNT).then(|| BookId(index as u8))
    }

    /// Position of this book in the canonical order (0-based).
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Canonical lowercase name, e.g. `"1john"`.
    pub fn as_str(self) -> &'static str {
        CANONICAL_BOOKS[self.index()].0
    }

    /// Human-readable title, e.g. `"1 John"`.
    pub fn title(self) -> &'static str {
        CANONICAL_BOOKS[self.index()].1
    }

    pub fn testament(self) -> Testament {
        if self.index() < OLD_TESTAMENT_LEN {
            Testament::Old
        } else {
            Testament::New
        }
    }

    /// Parse a book name.
    ///
    /// Case-insensitive; interior whitespace is ignored so `"1 John"` and
    /// `"Song of Solomon"` both resolve.
    pub fn parse(name: &str) -> Option<BookId> {
        let folded: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        CANONICAL_BOOKS
            .iter()
            .position(|(canonical, _)| *canonical == folded)
            .map(|i| BookId(i as u8))
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookId {
    type Err = UnknownBook;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookId::parse(s).ok_or_else(|| UnknownBook(s.to_string()))
    }
}

impl Serialize for BookId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Old or New Testament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

/// A validated book: chapters → verses → text, both levels ascending.
///
/// Immutable once built. The on-disk JSON encodes chapter and verse numbers
/// as strings; they are converted to integers here and never handled as
/// text again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDocument {
    chapters: BTreeMap<ChapterNumber, Chapter>,
}

impl BookDocument {
    /// Parse and validate a book document.
    ///
    /// Expected shape: `{"1": {"1": "In the beginning…", …}, …}`. Every
    /// chapter and verse key must be a positive integer, and no two keys
    /// may denote the same number (`"1"` and `"01"`).
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(text)?;

        let mut chapters = BTreeMap::new();
        for (chapter_key, verses_raw) in raw {
            let chapter = parse_number(&chapter_key)
                .ok_or_else(|| DocumentError::InvalidChapterKey(chapter_key.clone()))?;

            let mut verses = Chapter::new();
            for (verse_key, text) in verses_raw {
                let verse = parse_number(&verse_key).ok_or_else(|| {
                    DocumentError::InvalidVerseKey {
                        chapter,
                        key: verse_key.clone(),
                    }
                })?;
                match verses.entry(verse) {
                    Entry::Vacant(slot) => {
                        slot.insert(text);
                    }
                    Entry::Occupied(_) => {
                        return Err(DocumentError::DuplicateVerse { chapter, verse })
                    }
                }
            }

            match chapters.entry(chapter) {
                Entry::Vacant(slot) => {
                    slot.insert(verses);
                }
                Entry::Occupied(_) => return Err(DocumentError::DuplicateChapter(chapter)),
            }
        }

        Ok(Self { chapters })
    }

    /// Build a document from already-typed chapters.
    pub fn from_chapters(chapters: BTreeMap<ChapterNumber, Chapter>) -> Self {
        Self { chapters }
    }

    pub fn chapter(&self, chapter: ChapterNumber) -> Option<&Chapter> {
        self.chapters.get(&chapter)
    }

    /// Available chapter numbers, ascending.
    pub fn chapter_numbers(&self) -> impl DoubleEndedIterator<Item = ChapterNumber> + '_ {
        self.chapters.keys().copied()
    }

    pub fn chapters(&self) -> impl Iterator<Item = (ChapterNumber, &Chapter)> {
        self.chapters.iter().map(|(n, c)| (*n, c))
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn verse_count(&self) -> usize {
        self.chapters.values().map(BTreeMap::len).sum()
    }
}

fn parse_number(key: &str) -> Option<u32> {
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|n| *n > 0)
}

/// A matched verse returned from the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub book: BookId,
    pub chapter: ChapterNumber,
    pub verse: VerseNumber,
    pub text: String,
}

/// The current (or last viewed) reading location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationPosition {
    pub book: BookId,
    pub chapter: ChapterNumber,
}

impl NavigationPosition {
    pub fn new(book: BookId, chapter: ChapterNumber) -> Self {
        Self { book, chapter }
    }
}

impl fmt::Display for NavigationPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book.title(), self.chapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_and_testaments() {
        let all: Vec<BookId> = BookId::all().collect();
        assert_eq!(all.len(), BOOK_COUNT);
        assert_eq!(all[0].as_str(), "genesis");
        assert_eq!(all[38].as_str(), "malachi");
        assert_eq!(all[39].as_str(), "matthew");
        assert_eq!(all[65].as_str(), "revelation");
        assert_eq!(all[38].testament(), Testament::Old);
        assert_eq!(all[39].testament(), Testament::New);
        assert_eq!(
            all.iter().filter(|b| b.testament() == Testament::New).count(),
            27
        );
    }

    #[test]
    fn parse_is_case_and_space_insensitive() {
        assert_eq!(BookId::parse("1 John").map(BookId::as_str), Some("1john"));
        assert_eq!(
            BookId::parse("Song of Solomon").map(BookId::as_str),
            Some("songofsolomon")
        );
        assert_eq!(BookId::parse("GENESIS").map(BookId::index), Some(0));
        assert!(BookId::parse("maccabees").is_none());
        assert!("".parse::<BookId>().is_err());
    }

    #[test]
    fn book_id_serializes_as_name() {
        let john = BookId::parse("john").unwrap();
        assert_eq!(serde_json::to_string(&john).unwrap(), "\"john\"");
        let back: BookId = serde_json::from_str("\"john\"").unwrap();
        assert_eq!(back, john);
        assert!(serde_json::from_str::<BookId>("\"nope\"").is_err());
    }

    #[test]
    fn document_orders_numerically() {
        let doc = BookDocument::from_json(
            r#"{"10": {"2": "b", "1": "a"}, "2": {"10": "z", "9": "y"}}"#,
        )
        .unwrap();
        let chapters: Vec<u32> = doc.chapter_numbers().collect();
        assert_eq!(chapters, vec![2, 10]);
        let verses: Vec<u32> = doc.chapter(2).unwrap().keys().copied().collect();
        assert_eq!(verses, vec![9, 10]);
        assert_eq!(doc.verse_count(), 4);
    }

    #[test]
    fn document_rejects_bad_keys() {
        assert!(matches!(
            BookDocument::from_json(r#"{"one": {"1": "a"}}"#),
            Err(DocumentError::InvalidChapterKey(_))
        ));
        assert!(matches!(
            BookDocument::from_json(r#"{"1": {"1a": "a"}}"#),
            Err(DocumentError::InvalidVerseKey { chapter: 1, .. })
        ));
        assert!(matches!(
            BookDocument::from_json(r#"{"0": {"1": "a"}}"#),
            Err(DocumentError::InvalidChapterKey(_))
        ));
        assert!(matches!(
            BookDocument::from_json(r#"{"1": {"1": "a"}, "01": {"1": "b"}}"#),
            Err(DocumentError::DuplicateChapter(1))
        ));
        assert!(matches!(
            BookDocument::from_json(r#"{"1": {"1": 5}}"#),
            Err(DocumentError::Json(_))
        ));
    }
}
