use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context as _;
use rand::Rng as _;
use rand_pcg::Pcg32;
use rltris_engine::Seed;
use serde::{Serialize, de::DeserializeOwned};
use tracing::info;

/// JSON sink: a file when a path is given, stdout otherwise.
pub(crate) struct Output {
    writer: Box<dyn Write>,
    name: String,
}

impl Output {
    pub(crate) fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                writer: Box::new(io::stdout().lock()),
                name: "stdout".to_owned(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            name: path.display().to_string(),
        })
    }

    pub(crate) fn write_json<T>(mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.name))?;
        writeln!(self.writer)
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to flush output to {}", self.name))?;
        Ok(())
    }
}

pub(crate) fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    Output::create(path)?.write_json(value)
}

pub(crate) fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file)).with_context(|| {
        format!("Failed to parse {} JSON file: {}", file_kind, path.display())
    })?;
    Ok(value)
}

/// Reads an optional JSON config file, falling back to defaults.
pub(crate) fn read_config<T, P>(path: Option<P>) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    match path {
        Some(path) => read_json_file("config", path),
        None => Ok(T::default()),
    }
}

/// The run seed, drawn at random when none is given, and the generator every
/// random draw of the run comes from. The simulator's piece seed is the first
/// value drawn from it.
pub(crate) fn seeded_rng(seed: Option<Seed>) -> (Seed, Pcg32) {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!(%seed, "using seed");
    (seed, seed.rng())
}
