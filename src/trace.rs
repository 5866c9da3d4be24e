mod formatter;

pub use formatter::TranscriptFormatter;
