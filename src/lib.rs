/*! ITAB MEG Reader
 *
 * Pure Rust reader for recordings from ITAB MEG systems. A recording is a
 * file pair: the `.raw` binary payload and its `.mhd` header. The header is
 * converted into FIFF-style measurement info (the schema used by MNE), and
 * sample ranges are streamed out of the payload as calibrated
 * (channels × samples) matrices.
 *
 * # Public API
 *
 * ## Core Functions
 * - [`read_raw_itab`]: Open an ITAB recording
 * - [`mhd_to_info`]: Build measurement info from a parsed header
 * - [`convert_time`]: Header date/time strings to UTC epoch seconds
 * - [`mult_cal_one`]: Apply calibration or a projector to raw integers
 *
 * ## Data Structures
 * - [`RawItab`]: Open recording with segment reads and optional preload
 * - [`MeasInfo`]: Measurement metadata (channels, sampling rate, digitization, etc.)
 * - [`ChannelInfo`]: Channel information (name, type, calibration, location)
 * - [`DigPoint`]: Digitized fiducial or HPI coil
 * - [`MhdHeader`]: Parsed mhd header record
 *
 * ## Header Sources
 * The mhd binary layout is decoded by a [`HeaderSource`]. [`JsonHeaderSource`]
 * reads header records exported as JSON and is used by [`read_raw_itab`].
 *
 * ## Constants
 * ITAB channel type codes (ITABV_*) and the FIFF constants used in the
 * output schema are re-exported from the [`constants`] module.
 */

// Submodules
pub mod constants;
pub mod error;
pub mod info;
pub mod mhd;
pub mod segment;

// Re-exports: Public API
pub use constants::*;
pub use error::{ItabError, Result};
pub use info::{
    convert_time, mhd_channel_to_info, mhd_to_info, ChannelInfo, DigPoint, Event,
    LogicalNumbers, MeasInfo, SubjectInfo,
};
pub use mhd::{
    mhd_path_for, HeaderSource, JsonHeaderSource, MhdChannel, MhdHeader, MhdMarker,
    MhdPosition, MhdSample, MhdSubjectInfo,
};
pub use segment::{check_payload, mult_cal_one, read_raw_block, read_segment_file, resolve_range};

use ndarray::{s, Array2, ArrayView2, ArrayViewMut2};
use std::path::{Path, PathBuf};

/// Open ITAB recording
#[derive(Debug)]
pub struct RawItab {
    info: MeasInfo,
    filenames: Vec<PathBuf>,
    first_samps: Vec<usize>,
    last_samps: Vec<usize>,
    data: Option<Array2<f64>>,
}

impl RawItab {
    /// Open a `.raw` file, reading its header with [`JsonHeaderSource`]
    pub fn open(path: &Path, preload: bool) -> Result<Self> {
        Self::open_with(path, &JsonHeaderSource, preload)
    }

    /// Open a `.raw` file with a custom header source
    pub fn open_with<H: HeaderSource + ?Sized>(
        path: &Path,
        source: &H,
        preload: bool,
    ) -> Result<Self> {
        let mhd_path = mhd_path_for(path)?;
        log::info!("Reading ITAB header {}", mhd_path.display());

        let mhd = source.read_header(&mhd_path)?;
        let info = mhd_to_info(mhd)?;
        if info.n_samp == 0 {
            return Err(ItabError::InvalidHeader(format!(
                "{} declares no samples",
                mhd_path.display()
            )));
        }

        let mut raw = RawItab {
            last_samps: vec![info.n_samp - 1],
            first_samps: vec![0],
            filenames: vec![path.to_path_buf()],
            info,
            data: None,
        };

        if preload {
            raw.load_data()?;
        }

        log::info!(
            "Opened {}: {} channels, {:.3} s",
            path.display(),
            raw.info.nchan,
            raw.info.buffer_size_sec
        );

        Ok(raw)
    }

    pub fn info(&self) -> &MeasInfo {
        &self.info
    }

    pub fn filenames(&self) -> &[PathBuf] {
        &self.filenames
    }

    pub fn first_samp(&self) -> usize {
        self.first_samps[0]
    }

    pub fn last_samp(&self) -> usize {
        self.last_samps[0]
    }

    /// Number of samples in the recording
    pub fn n_times(&self) -> usize {
        self.last_samp() - self.first_samp() + 1
    }

    /// Sample times in seconds, relative to the first sample
    pub fn times(&self) -> Vec<f64> {
        (0..self.n_times())
            .map(|i| i as f64 / self.info.sfreq)
            .collect()
    }

    /// Mark additional channels as bad
    pub fn add_bads<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        self.info.add_bads(names)
    }

    pub fn is_preloaded(&self) -> bool {
        self.data.is_some()
    }

    /// Read the whole recording into memory
    pub fn load_data(&mut self) -> Result<()> {
        if self.data.is_none() {
            self.data = Some(self.read_segment(0, None)?);
            log::debug!("Preloaded {} samples", self.n_times());
        }
        Ok(())
    }

    /// Read calibrated samples `[start, stop)` of all channels from disk
    pub fn read_segment(&self, start: usize, stop: Option<usize>) -> Result<Array2<f64>> {
        let (start, stop) = resolve_range(start, stop, self.info.n_samp)?;
        check_payload(&self.filenames[0], &self.info, start, stop - start)?;
        let mut data = Array2::zeros((self.info.nchan, stop - start));
        self.read_segment_into(data.view_mut(), start, Some(stop), None, None)?;
        Ok(data)
    }

    /// Read `[start, stop)` into a caller buffer with optional channel
    /// selection or projector (see [`mult_cal_one`])
    pub fn read_segment_into(
        &self,
        dest: ArrayViewMut2<f64>,
        start: usize,
        stop: Option<usize>,
        selection: Option<&[usize]>,
        mult: Option<ArrayView2<f64>>,
    ) -> Result<()> {
        read_segment_file(
            &self.filenames[0],
            &self.info,
            start,
            stop,
            dest,
            selection,
            mult,
        )
    }

    /// Calibrated samples `[start, stop)`, served from memory when preloaded
    pub fn get_data(&self, start: usize, stop: Option<usize>) -> Result<Array2<f64>> {
        match &self.data {
            Some(data) => {
                let (start, stop) = resolve_range(start, stop, self.info.n_samp)?;
                Ok(data.slice(s![.., start..stop]).to_owned())
            }
            None => self.read_segment(start, stop),
        }
    }
}

/// Open an ITAB recording from its `.raw` file
pub fn read_raw_itab(path: &Path, preload: bool) -> Result<RawItab> {
    RawItab::open(path, preload)
}
