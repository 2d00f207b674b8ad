//! State-dict file format.
//!
//! ```text
//! [u64 LE: header length][JSON header][f32 LE payload]
//! ```
//!
//! The header maps each tensor name to `{"shape": [...], "offset": n}` where
//! `offset` counts `f32` elements from the start of the payload. Every tensor
//! is stored as `f32`; `f64` tensors are narrowed when written.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use frameloss_core::{FrameLossError, Tensor};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Named tensors, ordered by name.
pub type StateDict = BTreeMap<String, Tensor>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TensorEntry {
    shape: Vec<usize>,
    offset: usize,
}

fn weight_error(message: impl Into<String>) -> FrameLossError {
    FrameLossError::WeightLoading(message.into())
}

pub fn write_state_dict<W: Write>(state_dict: &StateDict, writer: &mut W) -> Result<(), FrameLossError> {
    let mut header = BTreeMap::new();
    let mut offset = 0usize;
    for (name, tensor) in state_dict {
        header.insert(
            name.clone(),
            TensorEntry {
                shape: tensor.shape(),
                offset,
            },
        );
        offset += tensor.numel();
    }
    let header_json = serde_json::to_vec(&header).map_err(|e| weight_error(format!("header encoding failed: {}", e)))?;
    writer.write_all(&(header_json.len() as u64).to_le_bytes())?;
    writer.write_all(&header_json)?;

    for tensor in state_dict.values() {
        for value in tensor.to_f64_vec()? {
            writer.write_all(&(value as f32).to_le_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn read_state_dict<R: Read>(reader: &mut R) -> Result<StateDict, FrameLossError> {
    let mut len_bytes = [0u8; 8];
    reader.read_exact(&mut len_bytes)?;
    let header_len = u64::from_le_bytes(len_bytes);

    // The length prefix is untrusted: read at most that many bytes instead of
    // allocating them up front.
    let mut header_json = Vec::new();
    reader.by_ref().take(header_len).read_to_end(&mut header_json)?;
    if header_json.len() as u64 != header_len {
        return Err(weight_error(format!(
            "header announces {} bytes but only {} are present",
            header_len,
            header_json.len()
        )));
    }
    let header: BTreeMap<String, TensorEntry> =
        serde_json::from_slice(&header_json).map_err(|e| weight_error(format!("invalid header: {}", e)))?;

    let mut payload_bytes = Vec::new();
    reader.read_to_end(&mut payload_bytes)?;
    if payload_bytes.len() % 4 != 0 {
        return Err(weight_error(format!(
            "payload of {} bytes is not a whole number of f32 values",
            payload_bytes.len()
        )));
    }
    let payload: Vec<f32> = payload_bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let mut state_dict = StateDict::new();
    for (name, entry) in header {
        let numel = entry
            .shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| weight_error(format!("tensor '{}' has an oversized shape {:?}", name, entry.shape)))?;
        let end = entry
            .offset
            .checked_add(numel)
            .filter(|&end| end <= payload.len())
            .ok_or_else(|| {
                weight_error(format!(
                    "tensor '{}' spans {} element(s) from offset {} but the payload holds {}",
                    name,
                    numel,
                    entry.offset,
                    payload.len()
                ))
            })?;
        let tensor = Tensor::new(payload[entry.offset..end].to_vec(), entry.shape)?;
        state_dict.insert(name, tensor);
    }
    debug!("Read {} tensor(s), {} f32 value(s)", state_dict.len(), payload.len());
    Ok(state_dict)
}

pub fn save_state_dict<P: AsRef<Path>>(state_dict: &StateDict, path: P) -> Result<(), FrameLossError> {
    let mut writer = BufWriter::new(File::create(&path)?);
    write_state_dict(state_dict, &mut writer)?;
    info!("Saved {} tensor(s) to {}", state_dict.len(), path.as_ref().display());
    Ok(())
}

pub fn load_state_dict<P: AsRef<Path>>(path: P) -> Result<StateDict, FrameLossError> {
    let mut reader = BufReader::new(File::open(&path)?);
    let state_dict = read_state_dict(&mut reader)?;
    info!("Loaded {} tensor(s) from {}", state_dict.len(), path.as_ref().display());
    Ok(state_dict)
}
