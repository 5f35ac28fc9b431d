use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::streams::stream::Stream;

use crate::streams::arff::parser::{is_comment_or_empty, parse_header, parse_instance_values};
use std::fs::File;
use std::io::{BufRead, BufReader, Error, Seek, SeekFrom};
use std::path::PathBuf;

/// Reads labelled instances from an ARFF file. Rows that do not parse are
/// skipped with a warning.
#[derive(Debug)]
pub struct ArffFileStream {
    path: PathBuf,
    reader: BufReader<File>,
    header: InstanceHeader,
    class_index: usize,
    data_start_pos: u64,
    next_line: Option<String>,
    finished: bool,
    skipped: u64,
}

impl Stream for ArffFileStream {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.next_line.is_some()
    }

    fn next_instance(&mut self) -> Option<Instance> {
        loop {
            let line = self.next_line.take()?;
            if let Err(e) = self.fill_next_line() {
                tracing::warn!(path = %self.path.display(), error = %e, "stopped reading ARFF data");
                self.finished = true;
                self.next_line = None;
            }

            match parse_instance_values(&self.header, self.class_index, &line) {
                Ok((values, label)) => return Some(Instance::labelled(values, label)),
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(line = %line, error = %e, "skipping invalid ARFF row");
                }
            }
        }
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.reader = BufReader::new(File::open(&self.path)?);
        self.reader.seek(SeekFrom::Start(self.data_start_pos))?;
        self.finished = false;
        self.next_line = None;
        self.skipped = 0;
        self.fill_next_line()
    }
}

impl ArffFileStream {
    /// Opens `path`; the class is the attribute at `class_index`, the last
    /// one when `None`.
    pub fn new(path: PathBuf, class_index: Option<usize>) -> Result<Self, Error> {
        let file = File::open(&path)?;
        let mut reader = BufReader::new(file);

        let (header, class_index, data_start_pos) = parse_header(&mut reader, class_index)?;

        let mut stream = ArffFileStream {
            path,
            reader,
            header,
            class_index,
            data_start_pos,
            next_line: None,
            finished: false,
            skipped: 0,
        };

        stream.fill_next_line()?;
        Ok(stream)
    }

    /// Rows dropped since the last restart because they failed to parse.
    pub fn skipped_rows(&self) -> u64 {
        self.skipped
    }

    fn fill_next_line(&mut self) -> Result<(), Error> {
        if self.finished {
            self.next_line = None;
            return Ok(());
        }
        let mut line = String::new();
        loop {
            line.clear();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                self.finished = true;
                self.next_line = None;
                return Ok(());
            }
            if !is_comment_or_empty(&line) {
                self.next_line = Some(line.trim().to_string());
                return Ok(());
            }
        }
    }
}
