//! Input numbering and `-filter_complex` rendering.

use crate::streams::{Instream, Source, StreamKind, Synthetic};
use crate::track::Track;
use crate::{Error, Result};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// Value ffmpeg accepts as "probe everything" for analyzeduration/probesize.
pub const PROBE_ALL: &str = "2147483647";

/// Distinct command inputs in index order.
///
/// Generators come first, then files, each in first-encounter order over
/// the tracks' primary and auxiliary instreams. Instreams sharing a source
/// share an index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTable {
    synthetic: Vec<Synthetic>,
    files: Vec<PathBuf>,
}

impl InputTable {
    pub fn collect(tracks: &[Track]) -> Self {
        let mut table = Self::default();
        for instream in tracks.iter().flat_map(|t| t.outstream().instreams()) {
            match instream.source() {
                Source::Synthetic(generator) => {
                    if !table.synthetic.contains(generator) {
                        table.synthetic.push(*generator);
                    }
                }
                Source::File(path) => {
                    if !table.files.contains(path) {
                        table.files.push(path.clone());
                    }
                }
            }
        }
        table
    }

    /// Input index of the source `instream` reads from.
    pub fn index_of(&self, instream: &Instream) -> Option<usize> {
        match instream.source() {
            Source::Synthetic(generator) => self.synthetic.iter().position(|g| g == generator),
            Source::File(path) => self
                .files
                .iter()
                .position(|p| p == path)
                .map(|i| i + self.synthetic.len()),
        }
    }

    /// Stream specifier `<index>:<kind>:<selector>` for `instream`.
    pub fn stream_label(&self, instream: &Instream) -> Result<String> {
        let index = self.index_of(instream).ok_or_else(|| {
            Error::invalid_source(format!("{:?} is not an input of this command", instream.source()))
        })?;
        Ok(format!(
            "{}:{}:{}",
            index,
            instream.kind().code(),
            instream.selector()
        ))
    }

    /// All `-i` clauses, generators first.
    pub fn input_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self
            .synthetic
            .iter()
            .flat_map(Synthetic::input_args)
            .map(OsString::from)
            .collect();
        for path in &self.files {
            args.extend(
                ["-analyzeduration", PROBE_ALL, "-probesize", PROBE_ALL, "-i"].map(OsString::from),
            );
            args.push(path.into());
        }
        args
    }

    pub fn len(&self) -> usize {
        self.synthetic.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_synthetic(&self) -> bool {
        !self.synthetic.is_empty()
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }
}

/// The rendered filter graph of a command and the output label of every
/// filtered track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    chains: Vec<String>,
    labels: Vec<Option<String>>,
}

impl FilterGraph {
    /// Render the chains of every filtered track in track order.
    ///
    /// Labels are numbered per kind (`vout0`, `aout0`, `vout1`, ...).
    /// Intermediate pads are named after the final label and the step
    /// index (`vout0_0`, `vout0_1`, ...).
    pub fn build(tracks: &[Track], inputs: &InputTable) -> Result<Self> {
        let mut counters: HashMap<StreamKind, usize> = HashMap::new();
        let mut graph = Self::default();

        for track in tracks {
            let outstream = track.outstream();
            if !outstream.is_filtered() {
                graph.labels.push(None);
                continue;
            }

            let counter = counters.entry(outstream.kind()).or_insert(0);
            let label = format!("{}{}", outstream.kind().label_prefix(), counter);
            *counter += 1;

            let last = outstream.filters().len() - 1;
            let mut running = inputs.stream_label(outstream.primary())?;
            let mut nodes = Vec::with_capacity(outstream.filters().len());

            for (i, step) in outstream.filters().iter().enumerate() {
                let mut pads = format!("[{}]", running);
                if let Some(secondary) = step.secondary_input() {
                    pads.push_str(&format!("[{}]", inputs.stream_label(secondary)?));
                }

                let node = if i == last {
                    label.clone()
                } else {
                    format!("{}_{}", label, i)
                };
                nodes.push(format!("{}{}[{}]", pads, step.expression(), node));
                running = node;
            }

            graph.chains.push(nodes.join(";"));
            graph.labels.push(Some(label));
        }

        Ok(graph)
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// The `-filter_complex` value, `None` when nothing is filtered.
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.chains.join(";"))
        }
    }

    /// Output label of the track at `track_index`, if it is filtered.
    pub fn label(&self, track_index: usize) -> Option<&str> {
        self.labels.get(track_index).and_then(|l| l.as_deref())
    }
}
