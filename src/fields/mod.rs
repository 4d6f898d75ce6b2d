//! The field registry.
//!
//! Each accounting column jobinfo knows about is declared once in [`FIELDS`]
//! together with the rules used to:
//! - **parse** one raw `sacct`/`sstat` value ([`ParseRule`])
//! - **combine** values of the same column coming from several records ([`Combine`])
//! - **format** the merged value for the report ([`Format`])
//!
//! A [`Record`](crate::record::Record) holds exactly one [`Value`] per entry
//! of this table, in table order. [`LIVE_FIELDS`] is the ordered subset that
//! `sstat` reports for running jobs.

pub mod combine;
pub mod format;
pub mod parse;
pub mod time;

pub use combine::Combine;
pub use format::Format;
pub use parse::ParseRule;

/// A parsed field value.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    /// Plain strings, dates, duration strings and comma-joined token sets.
    Text(String),
    Count(u64),
    /// A number of bytes, already scaled by its unit suffix.
    Bytes(f64),
}

impl Default for Value {
    fn default() -> Self {
        Value::Text(String::new())
    }
}

impl Value {
    /// Whether the value carries no information (`""`, `0`, `0.0`).
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Count(n) => *n == 0,
            Value::Bytes(b) => *b == 0.0,
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Value::Text(s) => s,
            _ => "",
        }
    }

    pub fn as_count(&self) -> u64 {
        match self {
            Value::Count(n) => *n,
            _ => 0,
        }
    }

    pub fn as_bytes(&self) -> f64 {
        match self {
            Value::Bytes(b) => *b,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    JobName,
    User,
    Partition,
    NodeList,
    Ncpus,
    State,
    Submit,
    Start,
    End,
    Timelimit,
    Elapsed,
    TotalCpu,
    UserCpu,
    SystemCpu,
    ReqMem,
    MaxRss,
    MaxRssNode,
    MaxDiskWrite,
    MaxDiskWriteNode,
    MaxDiskRead,
    MaxDiskReadNode,
    Comment,
    WorkDir,
}

pub const FIELD_COUNT: usize = 23;

impl FieldId {
    pub fn def(self) -> &'static FieldDef {
        &FIELDS[self as usize]
    }
}

/// Definition of a single accounting column.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub id: FieldId,
    /// Column name as understood by `sacct --format` and `sstat --format`.
    pub name: &'static str,
    /// Label printed in the report.
    pub description: &'static str,
    pub parse: ParseRule,
    pub combine: Combine,
    pub format: Format,
    pub visible: bool,
    /// Reported by `sstat` while the job runs; the live value is merged over
    /// the accounting value.
    pub prefer_live: bool,
}

const fn field(
    id: FieldId,
    name: &'static str,
    description: &'static str,
    parse: ParseRule,
    combine: Combine,
    format: Format,
) -> FieldDef {
    FieldDef {
        id,
        name,
        description,
        parse,
        combine,
        format,
        visible: true,
        prefer_live: false,
    }
}

impl FieldDef {
    const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    const fn live(mut self) -> Self {
        self.prefer_live = true;
        self
    }
}

use Combine::{Append, KeepFirst, Max, TimeMax, TimeMin};
use ParseRule::{ByteSize, Count, Date, Text};

pub static FIELDS: [FieldDef; FIELD_COUNT] = [
    field(FieldId::JobName, "JobName", "Name", Text, KeepFirst, Format::Plain),
    field(FieldId::User, "User", "User", Text, KeepFirst, Format::Plain),
    field(FieldId::Partition, "Partition", "Partition", Text, KeepFirst, Format::Plain),
    field(FieldId::NodeList, "NodeList", "Nodes", Text, KeepFirst, Format::Plain),
    field(FieldId::Ncpus, "NCPUS", "Cores", Count, Max, Format::Plain),
    field(FieldId::State, "State", "State", Text, Append, Format::State),
    field(FieldId::Submit, "Submit", "Submit", Text, KeepFirst, Format::Date),
    field(FieldId::Start, "Start", "Start", Date, TimeMin, Format::Date),
    field(FieldId::End, "End", "End", Text, TimeMax, Format::Date),
    field(FieldId::Timelimit, "Timelimit", "Reserved walltime", Text, TimeMax, Format::Duration),
    field(FieldId::Elapsed, "Elapsed", "Used walltime", Text, TimeMax, Format::Duration),
    field(FieldId::TotalCpu, "TotalCPU", "Used CPU time", Text, Max, Format::CpuTime),
    field(FieldId::UserCpu, "UserCPU", "% User (Computation)", Text, Max, Format::CpuShare),
    field(FieldId::SystemCpu, "SystemCPU", "% System (I/O)", Text, Max, Format::CpuShare),
    field(FieldId::ReqMem, "ReqMem", "Mem reserved", Text, KeepFirst, Format::MemRequest),
    field(
        FieldId::MaxRss,
        "MaxRSS",
        "Max Mem used",
        ByteSize,
        Max,
        Format::ByteSize { node: FieldId::MaxRssNode },
    )
    .live(),
    field(FieldId::MaxRssNode, "MaxRSSNode", "", Text, Append, Format::Plain)
        .hidden()
        .live(),
    field(
        FieldId::MaxDiskWrite,
        "MaxDiskWrite",
        "Max Disk Write",
        ByteSize,
        Max,
        Format::ByteSize { node: FieldId::MaxDiskWriteNode },
    )
    .live(),
    field(FieldId::MaxDiskWriteNode, "MaxDiskWriteNode", "", Text, Append, Format::Plain)
        .hidden()
        .live(),
    field(
        FieldId::MaxDiskRead,
        "MaxDiskRead",
        "Max Disk Read",
        ByteSize,
        Max,
        Format::ByteSize { node: FieldId::MaxDiskReadNode },
    )
    .live(),
    field(FieldId::MaxDiskReadNode, "MaxDiskReadNode", "", Text, Append, Format::Plain)
        .hidden()
        .live(),
    field(FieldId::Comment, "Comment", "Comment", Text, KeepFirst, Format::Plain),
    field(FieldId::WorkDir, "WorkDir", "Working directory", Text, KeepFirst, Format::Plain),
];

pub const LIVE_COUNT: usize = 6;

/// Columns reported by `sstat`, in registry order.
pub const LIVE_FIELDS: [FieldId; LIVE_COUNT] = [
    FieldId::MaxRss,
    FieldId::MaxRssNode,
    FieldId::MaxDiskWrite,
    FieldId::MaxDiskWriteNode,
    FieldId::MaxDiskRead,
    FieldId::MaxDiskReadNode,
];

/// Comma-separated column list for `--format`.
pub fn format_arg<'a>(fields: impl IntoIterator<Item = &'a FieldDef>) -> String {
    fields
        .into_iter()
        .map(|f| f.name)
        .collect::<Vec<_>>()
        .join(",")
}
