use crate::error::Result;
use crate::evaluation::Snapshot;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveFormat {
    Csv,
    Tsv,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct LearningCurve {
    entries: Vec<Snapshot>,
}

impl LearningCurve {
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push(snapshot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.entries.last().copied()
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn export<P: AsRef<Path>>(&self, path: P, fmt: CurveFormat) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        match fmt {
            CurveFormat::Csv => self.write_delimited(&mut w, ',')?,
            CurveFormat::Tsv => self.write_delimited(&mut w, '\t')?,
            CurveFormat::Json => {
                serde_json::to_writer(&mut w, &self.entries)?;
                writeln!(w)?;
            }
        }
        w.flush()?;
        Ok(())
    }

    fn write_delimited<W: Write>(&self, w: &mut W, delimiter: char) -> Result<()> {
        writeln!(
            w,
            "instances_seen{d}accuracy{d}labels_acquired{d}budget_used{d}seconds",
            d = delimiter
        )?;
        for s in &self.entries {
            writeln!(
                w,
                "{}{d}{:.12}{d}{}{d}{:.12}{d}{:.6}",
                s.instances_seen,
                s.accuracy,
                s.labels_acquired,
                s.budget_used(),
                s.seconds,
                d = delimiter
            )?;
        }
        Ok(())
    }
}
