use crate::value::Value;

/// One column descriptor: which source table it came from (if any) and
/// its name. Name uniqueness is scoped by `source_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub source_table: Option<String>,
    pub column_name: String,
}

impl HeaderField {
    pub fn new(source_table: Option<String>, column_name: impl Into<String>) -> Self {
        HeaderField { source_table, column_name: column_name.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header(pub Vec<HeaderField>);

impl Header {
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.column_name.as_str()).collect()
    }

    pub fn position_of(&self, source_table: Option<&str>, column_name: &str) -> Option<usize> {
        self.0.iter().position(|f| {
            f.column_name == column_name && f.source_table.as_deref() == source_table
        })
    }
}

pub type Record = Vec<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf8Bom,
    Sjis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    Lf,
    CrLf,
    Cr,
}

impl LineBreak {
    pub fn as_str(self) -> &'static str {
        match self {
            LineBreak::Lf => "\n",
            LineBreak::CrLf => "\r\n",
            LineBreak::Cr => "\r",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonEscape {
    Backslash,
    HexDigits,
    AllWithHexDigits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Tsv,
    Fixed,
    Json,
    Ltsv,
    Gfm,
    Org,
    Text,
}

/// Side-channel describing how a View was loaded and how it should be
/// written back.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub path: String,
    pub format: Format,
    pub delimiter: char,
    pub delimiter_positions: Option<Vec<i64>>,
    pub encoding: Encoding,
    pub line_break: LineBreak,
    pub no_header: bool,
    pub enclose_all: bool,
    pub json_escape: JsonEscape,
    pub pretty_print: bool,
    pub is_temporary: bool,
}

impl FileInfo {
    pub fn temporary(path: impl Into<String>) -> Self {
        FileInfo {
            path: path.into(),
            format: Format::Csv,
            delimiter: ',',
            delimiter_positions: None,
            encoding: Encoding::Utf8,
            line_break: LineBreak::Lf,
            no_header: false,
            enclose_all: false,
            json_escape: JsonEscape::Backslash,
            pretty_print: false,
            is_temporary: true,
        }
    }

    /// Lower-cases the path for canonicalization on case-insensitive
    /// filesystems.
    pub fn canonical_path(&self) -> String {
        canonicalize_path(&self.path)
    }
}

pub fn canonicalize_path(path: &str) -> String {
    if cfg!(target_os = "windows") || cfg!(target_os = "macos") {
        path.to_lowercase()
    } else {
        path.to_string()
    }
}

/// A materialized table snapshot plus pending-mutation counters.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub header: Header,
    pub records: Vec<Record>,
    pub file_info: Option<FileInfo>,
    pub operated_records: usize,
    pub operated_fields: usize,
}

impl View {
    pub fn new(header: Header, records: Vec<Record>, file_info: Option<FileInfo>) -> Self {
        View { header, records, file_info, operated_records: 0, operated_fields: 0 }
    }

    /// Drained by the interpreter immediately after logging a `Result`
    ///.
    pub fn reset_operated_counters(&mut self) {
        self.operated_records = 0;
        self.operated_fields = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Insert,
    Update,
    Delete,
    CreateTable,
    AddColumns,
    DropColumns,
    RenameColumn,
}

impl ResultType {
    /// CREATE_TABLE outranks any other mutation on the same path during
    /// commit classification.
    pub fn precedence(self) -> u8 {
        match self {
            ResultType::CreateTable => 1,
            _ => 0,
        }
    }
}

/// One entry in the process-wide pending-write log.
#[derive(Debug, Clone)]
pub struct Result {
    pub result_type: ResultType,
    pub file_info: FileInfo,
    pub operated_count: usize,
}
