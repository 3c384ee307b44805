use crate::error::GameError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn save<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<(), GameError> {
    let mut f = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut f, value)?;
    f.flush()?;
    Ok(())
}

pub fn load<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, GameError> {
    let f = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(f)?)
}
