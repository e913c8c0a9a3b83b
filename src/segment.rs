/// Reading calibrated segments out of an ITAB `.raw` file
///
/// The payload after `start_data` is a row-major (samples × channels) array
/// of big-endian i32 values.
use crate::constants::ITAB_SAMPLE_BYTES;
use crate::error::{ItabError, Result};
use crate::info::MeasInfo;
use byteorder::{BigEndian, ByteOrder};
use ndarray::{Array2, ArrayView2, ArrayViewMut2};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Resolve a half-open sample range, `stop` defaulting to `n_samp`
pub fn resolve_range(start: usize, stop: Option<usize>, n_samp: usize) -> Result<(usize, usize)> {
    let stop = stop.unwrap_or(n_samp);
    if start >= stop || stop > n_samp {
        return Err(ItabError::EmptyRange { start, stop });
    }
    Ok((start, stop))
}

/// Byte offset and length of `n_samples` frames starting at sample `start`.
///
/// `None` when the span does not fit in a u64.
fn frame_span(start_data: u64, nchan: usize, start: usize, n_samples: usize) -> Option<(u64, u64)> {
    let frame_bytes = (nchan as u64).checked_mul(ITAB_SAMPLE_BYTES as u64)?;
    let offset = (start as u64)
        .checked_mul(frame_bytes)?
        .checked_add(start_data)?;
    let len = (n_samples as u64).checked_mul(frame_bytes)?;
    Some((offset, len))
}

/// Check that a payload of `file_len` bytes holds the requested span
fn check_span(
    file_len: u64,
    start_data: u64,
    nchan: usize,
    start: usize,
    n_samples: usize,
) -> Result<(u64, u64)> {
    let (offset, expected) = match frame_span(start_data, nchan, start, n_samples) {
        Some(span) => span,
        None => {
            return Err(ItabError::ShortRead {
                expected: u64::MAX,
                available: file_len.saturating_sub(start_data),
            })
        }
    };

    let available = file_len.saturating_sub(offset);
    if available < expected {
        return Err(ItabError::ShortRead {
            expected,
            available,
        });
    }
    Ok((offset, expected))
}

/// Fail with `ShortRead` unless the `.raw` file holds samples
/// `[start, start + n_samples)` of every channel.
pub fn check_payload(path: &Path, info: &MeasInfo, start: usize, n_samples: usize) -> Result<()> {
    let file_len = std::fs::metadata(path)?.len();
    check_span(file_len, info.start_data, info.nchan, start, n_samples)?;
    Ok(())
}

/// Read `n_samples` samples of all channels starting at sample `start`.
///
/// Returns the raw integers as (channels × samples). Nothing is returned
/// unless the whole span is present.
pub fn read_raw_block<R: Read + Seek>(
    reader: &mut R,
    start_data: u64,
    nchan: usize,
    start: usize,
    n_samples: usize,
) -> Result<Array2<i32>> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    let (offset, expected) = check_span(file_len, start_data, nchan, start, n_samples)?;
    let available = file_len - offset;
    let len = usize::try_from(expected).map_err(|_| ItabError::ShortRead {
        expected,
        available,
    })?;

    reader.seek(SeekFrom::Start(offset))?;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => ItabError::ShortRead {
            expected,
            available,
        },
        _ => ItabError::Io(e),
    })?;

    let mut values = vec![0i32; len / ITAB_SAMPLE_BYTES];
    BigEndian::read_i32_into(&bytes, &mut values);

    let by_sample = Array2::from_shape_vec((n_samples, nchan), values)
        .map_err(|e| ItabError::ShapeMismatch(e.to_string()))?;
    Ok(by_sample.reversed_axes())
}

/// Calibrate raw (channels × samples) data into `dest`.
///
/// With a projector `mult` (rows × channels, calibration already folded in)
/// `dest = mult · raw`. Otherwise each selected channel is scaled by its
/// entry in `cals`; `selection` of `None` keeps every channel in order.
pub fn mult_cal_one(
    mut dest: ArrayViewMut2<f64>,
    raw: ArrayView2<i32>,
    selection: Option<&[usize]>,
    cals: &[f64],
    mult: Option<ArrayView2<f64>>,
) -> Result<()> {
    let (nchan, n_samples) = raw.dim();
    if dest.ncols() != n_samples {
        return Err(ItabError::ShapeMismatch(format!(
            "destination has {} columns, segment has {} samples",
            dest.ncols(),
            n_samples
        )));
    }

    if let Some(mult) = mult {
        if mult.ncols() != nchan || mult.nrows() != dest.nrows() {
            return Err(ItabError::ShapeMismatch(format!(
                "projector is {}x{}, expected {}x{}",
                mult.nrows(),
                mult.ncols(),
                dest.nrows(),
                nchan
            )));
        }
        let raw = raw.mapv(f64::from);
        dest.assign(&mult.dot(&raw));
        return Ok(());
    }

    if cals.len() != nchan {
        return Err(ItabError::ShapeMismatch(format!(
            "{} calibration factors for {} channels",
            cals.len(),
            nchan
        )));
    }

    let all: Vec<usize>;
    let selection = match selection {
        Some(sel) => sel,
        None => {
            all = (0..nchan).collect();
            &all
        }
    };
    if dest.nrows() != selection.len() {
        return Err(ItabError::ShapeMismatch(format!(
            "destination has {} rows, {} channels selected",
            dest.nrows(),
            selection.len()
        )));
    }

    for (row, &ch) in selection.iter().enumerate() {
        if ch >= nchan {
            return Err(ItabError::ShapeMismatch(format!(
                "channel index {} out of range for {} channels",
                ch, nchan
            )));
        }
        let cal = cals[ch];
        dest.row_mut(row)
            .zip_mut_with(&raw.row(ch), |d, &v| *d = f64::from(v) * cal);
    }

    Ok(())
}

/// Read `[start, stop)` from the `.raw` file into `dest`, calibrated.
///
/// The file is opened for this call only.
pub fn read_segment_file(
    path: &Path,
    info: &MeasInfo,
    start: usize,
    stop: Option<usize>,
    dest: ArrayViewMut2<f64>,
    selection: Option<&[usize]>,
    mult: Option<ArrayView2<f64>>,
) -> Result<()> {
    let (start, stop) = resolve_range(start, stop, info.n_samp)?;

    let raw = {
        let mut reader = BufReader::new(File::open(path)?);
        read_raw_block(&mut reader, info.start_data, info.nchan, start, stop - start)?
    };
    log::debug!(
        "Read samples {}..{} of {} channels from {}",
        start,
        stop,
        info.nchan,
        path.display()
    );

    mult_cal_one(dest, raw.view(), selection, &info.cals(), mult)
}
