/// Measurement info built from an ITAB mhd header
///
/// Produces the FIFF-style channel table, digitization and timing metadata
/// that MNE-compatible consumers expect.
use crate::constants::*;
use crate::error::{ItabError, Result};
use crate::mhd::{MhdChannel, MhdHeader, MhdMarker};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;
use std::collections::HashSet;

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%d-%b-%Y"];
// Follows a "<weekday>, " prefix; the weekday name is not checked against the date
const WEEKDAY_DATE_FORMAT: &str = "%b %d, %Y";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Channel information in FIFF layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelInfo {
    pub scanno: i32,           // Scan number (1-based position in the file)
    pub logno: i32,            // Logical channel number within its class
    pub kind: i32,             // Channel type (MEG, BIO, MISC)
    pub range: f64,            // Range scaling factor
    pub cal: f64,              // Calibration coefficient
    pub coil_type: i32,        // Coil/sensor type
    pub coord_frame: i32,      // Frame of `loc`
    pub loc: [f64; 12],        // r0, ex, ey, ez
    pub unit: i32,             // Physical unit
    pub unit_mul: Option<i32>, // Unit multiplier, None when the unit string is unknown
    pub ch_name: String,
}

impl ChannelInfo {
    /// Generic descriptor used before the channel type is known
    fn generic(ch_name: String, scanno: i32) -> Self {
        ChannelInfo {
            scanno,
            logno: 0,
            kind: FIFFV_MISC_CH,
            range: 1.0,
            cal: 1.0,
            coil_type: FIFFV_COIL_NONE,
            coord_frame: FIFFV_COORD_UNKNOWN,
            loc: [0.0; 12],
            unit: FIFF_UNIT_NONE,
            unit_mul: None,
            ch_name,
        }
    }

    /// Get the full calibration factor (cal * range)
    pub fn calibration(&self) -> f64 {
        self.cal * self.range
    }

    /// Check if this is a data channel (not stimulus, etc.)
    pub fn is_data_channel(&self) -> bool {
        is_data_channel(self.kind)
    }

    /// Get human-readable channel type name
    pub fn type_name(&self) -> &'static str {
        channel_type_name(self.kind)
    }

    /// Unit label such as "fT" or "mV"
    pub fn unit_label(&self) -> String {
        format!(
            "{}{}",
            unit_mul_prefix(self.unit_mul.unwrap_or(FIFF_UNITM_NONE)),
            unit_name(self.unit)
        )
    }
}

/// Digitized head point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigPoint {
    pub coord_frame: i32,
    pub kind: i32,
    pub ident: i32,
    pub r: [f64; 3], // meters
}

impl DigPoint {
    fn from_marker(marker: &MhdMarker, kind: i32, ident: i32) -> Self {
        DigPoint {
            coord_frame: FIFFV_COORD_HEAD,
            kind,
            ident,
            r: [
                marker.posx / 1000.0,
                marker.posy / 1000.0,
                marker.posz / 1000.0,
            ],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        dig_kind_name(self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectInfo {
    pub first_name: String,
    pub last_name: String,
    pub sex: i32,
}

/// Trigger table entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Event {
    pub sample: i64,
    pub kind: i32,
    pub quality: i32,
}

/// Measurement info for one ITAB recording
#[derive(Debug, Clone, Serialize)]
pub struct MeasInfo {
    pub nchan: usize,
    pub sfreq: f64,
    pub chs: Vec<ChannelInfo>,
    pub ch_names: Vec<String>,

    // Filter information
    pub lowpass: Option<f64>,
    pub highpass: Option<f64>,

    // Timing
    pub meas_date: Option<i64>, // Unix timestamp (seconds since epoch, UTC)

    // Metadata
    pub description: Option<String>,
    pub subject_info: Option<SubjectInfo>,

    // Bad channels
    pub bads: Vec<String>,

    pub dig: Vec<DigPoint>,
    pub events: Vec<Event>,

    // Layout of the .raw file
    pub n_samp: usize,
    pub n_trials: usize, // Continuous acquisition, always 1
    pub start_data: u64,
    pub buffer_size_sec: f64,
}

impl MeasInfo {
    /// Empty info for the given sampling rate
    pub fn empty(sfreq: f64) -> Self {
        MeasInfo {
            nchan: 0,
            sfreq,
            chs: Vec::new(),
            ch_names: Vec::new(),
            lowpass: Some(sfreq / 2.0),
            highpass: Some(0.0),
            meas_date: None,
            description: None,
            subject_info: None,
            bads: Vec::new(),
            dig: Vec::new(),
            events: Vec::new(),
            n_samp: 0,
            n_trials: 1,
            start_data: 0,
            buffer_size_sec: 0.0,
        }
    }

    /// Validate the cross-field invariants of the info
    pub fn check_consistency(&self) -> Result<()> {
        if !(self.sfreq.is_finite() && self.sfreq > 0.0) {
            return Err(ItabError::ConsistencyViolation(format!(
                "sfreq must be positive, got {}",
                self.sfreq
            )));
        }

        if self.chs.len() != self.nchan || self.ch_names.len() != self.nchan {
            return Err(ItabError::ConsistencyViolation(format!(
                "nchan is {} but info has {} chs and {} ch_names",
                self.nchan,
                self.chs.len(),
                self.ch_names.len()
            )));
        }

        for (ch, name) in self.chs.iter().zip(&self.ch_names) {
            if &ch.ch_name != name {
                return Err(ItabError::ConsistencyViolation(format!(
                    "channel name mismatch: chs has {:?}, ch_names has {:?}",
                    ch.ch_name, name
                )));
            }
        }

        let mut seen = HashSet::with_capacity(self.ch_names.len());
        for name in &self.ch_names {
            if !seen.insert(name.as_str()) {
                return Err(ItabError::ConsistencyViolation(format!(
                    "channel name {:?} is not unique",
                    name
                )));
            }
        }

        if let Some(bad) = self.bads.iter().find(|bad| !seen.contains(bad.as_str())) {
            return Err(ItabError::ConsistencyViolation(format!(
                "bad channel {:?} is not in ch_names",
                bad
            )));
        }

        if self.n_trials != 1 {
            return Err(ItabError::ConsistencyViolation(format!(
                "continuous acquisition must have one trial, got {}",
                self.n_trials
            )));
        }

        Ok(())
    }

    /// Mark additional channels as bad
    pub fn add_bads<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        for name in names {
            let name = name.as_ref();
            if !self.ch_names.iter().any(|ch| ch == name) {
                return Err(ItabError::ConsistencyViolation(format!(
                    "bad channel {:?} is not in ch_names",
                    name
                )));
            }
            if !self.is_bad_channel(name) {
                self.bads.push(name.to_string());
            }
        }
        Ok(())
    }

    /// Get indices of good (non-bad) channels
    pub fn get_good_channels(&self) -> Vec<usize> {
        self.chs
            .iter()
            .enumerate()
            .filter(|(_, ch)| !self.bads.contains(&ch.ch_name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Check if a channel is marked as bad
    pub fn is_bad_channel(&self, channel_name: &str) -> bool {
        self.bads.iter().any(|bad| bad == channel_name)
    }

    /// Indices of channels of one FIFF kind
    pub fn pick_kind(&self, kind: i32) -> Vec<usize> {
        self.chs
            .iter()
            .enumerate()
            .filter(|(_, ch)| ch.kind == kind)
            .map(|(i, _)| i)
            .collect()
    }

    /// Per-channel calibration vector in channel order
    pub fn cals(&self) -> Vec<f64> {
        self.chs.iter().map(ChannelInfo::calibration).collect()
    }
}

/// Convert header date and time strings to seconds since the epoch.
///
/// The acquisition is assumed to be in UTC so the result does not depend on
/// the machine doing the conversion.
pub fn convert_time(date_str: &str, time_str: &str) -> Result<i64> {
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_str, fmt).ok())
        .or_else(|| parse_weekday_date(date_str))
        .ok_or_else(|| ItabError::MalformedTimestamp(date_str.to_string()))?;

    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time_str, fmt).ok())
        .ok_or_else(|| ItabError::MalformedTimestamp(time_str.to_string()))?;

    Ok(NaiveDateTime::new(date, time).and_utc().timestamp())
}

fn parse_weekday_date(date_str: &str) -> Option<NaiveDate> {
    let (weekday, rest) = date_str.split_once(", ")?;
    weekday.parse::<Weekday>().ok()?;
    NaiveDate::parse_from_str(rest, WEEKDAY_DATE_FORMAT).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelClass {
    Magnetic,
    Electric,
    Reference,
    Other,
}

impl ChannelClass {
    // Reference channels match any one of the reference sub-types.
    fn of(type_: i32) -> Self {
        match type_ {
            ITABV_MAG_CH => ChannelClass::Magnetic,
            ITABV_EEG_CH => ChannelClass::Electric,
            ITABV_REF_EEG_CH | ITABV_REF_MAG_CH | ITABV_REF_AUX_CH | ITABV_REF_PARAM_CH
            | ITABV_REF_DIGIT_CH | ITABV_REF_FLAG_CH => ChannelClass::Reference,
            _ => ChannelClass::Other,
        }
    }
}

/// Running logical numbers, one sequence per channel class
#[derive(Debug, Default)]
pub struct LogicalNumbers {
    meg: i32,
    eeg: i32,
    reference: i32,
}

impl LogicalNumbers {
    fn next(&mut self, class: ChannelClass) -> i32 {
        let counter = match class {
            ChannelClass::Magnetic => &mut self.meg,
            ChannelClass::Electric => &mut self.eeg,
            ChannelClass::Reference => &mut self.reference,
            ChannelClass::Other => return 0,
        };
        *counter += 1;
        *counter
    }
}

fn magnetic_unit_mul(unit: &str) -> Option<i32> {
    match unit {
        "fT" => Some(FIFF_UNITM_F),
        "pT" => Some(FIFF_UNITM_P),
        _ => None,
    }
}

// "uT" on a Volt channel is what ITAB headers carry; kept as micro.
fn electric_unit_mul(unit: &str) -> Option<i32> {
    match unit {
        "mV" => Some(FIFF_UNITM_M),
        "uT" => Some(FIFF_UNITM_MU),
        _ => None,
    }
}

/// Build one FIFF channel descriptor from an mhd channel record
pub fn mhd_channel_to_info(
    mhd_ch: &MhdChannel,
    scanno: i32,
    lognos: &mut LogicalNumbers,
) -> Result<ChannelInfo> {
    let mut ch = ChannelInfo::generic(mhd_ch.label.clone(), scanno);
    let class = ChannelClass::of(mhd_ch.type_);

    match class {
        ChannelClass::Magnetic => {
            let pos = mhd_ch.pos.first().ok_or_else(|| {
                ItabError::InvalidHeader(format!(
                    "magnetic channel {} has no position",
                    mhd_ch.label
                ))
            })?;
            ch.loc[0] = pos.posx / 1000.0;
            ch.loc[1] = pos.posy / 1000.0;
            ch.loc[2] = pos.posz / 1000.0;
            ch.loc[3] = pos.orix;
            ch.loc[7] = pos.oriy;
            ch.loc[11] = pos.oriz;
            ch.kind = FIFFV_MEG_CH;
            ch.coil_type = FIFFV_COIL_POINT_MAGNETOMETER;
            ch.cal = if mhd_ch.calib == 0.0 {
                ITAB_FALLBACK_MAG_CAL
            } else {
                mhd_ch.amvbit / mhd_ch.calib
            };
            ch.unit = FIFF_UNIT_T;
            ch.unit_mul = magnetic_unit_mul(&mhd_ch.unit);
        }
        ChannelClass::Electric => {
            if mhd_ch.calib == 0.0 {
                log::warn!(
                    "Electric channel {} has zero calibration, cal will not be finite",
                    mhd_ch.label
                );
            }
            ch.kind = FIFFV_BIO_CH;
            ch.cal = mhd_ch.amvbit / mhd_ch.calib;
            ch.unit = FIFF_UNIT_V;
            ch.unit_mul = electric_unit_mul(&mhd_ch.unit);
        }
        ChannelClass::Reference => {
            ch.kind = FIFFV_BIO_CH;
            ch.cal = 1.0;
            ch.unit = FIFF_UNIT_V;
            ch.unit_mul = electric_unit_mul(&mhd_ch.unit);
        }
        ChannelClass::Other => {
            log::debug!(
                "Channel {} has unknown type {}, keeping it as MISC",
                mhd_ch.label,
                mhd_ch.type_
            );
        }
    }

    ch.logno = lognos.next(class);
    Ok(ch)
}

fn build_dig(markers: &[MhdMarker], num_markers: usize) -> Result<Vec<DigPoint>> {
    if num_markers > markers.len() {
        log::warn!(
            "Header declares {} markers but only {} are present",
            num_markers,
            markers.len()
        );
    }
    let markers = &markers[..num_markers.min(markers.len())];
    if markers.len() < 4 {
        return Err(ItabError::InsufficientMarkers {
            found: markers.len(),
        });
    }

    let mut dig = vec![
        DigPoint::from_marker(&markers[0], FIFFV_POINT_CARDINAL, FIFFV_POINT_NASION),
        DigPoint::from_marker(&markers[1], FIFFV_POINT_CARDINAL, FIFFV_POINT_RPA),
        DigPoint::from_marker(&markers[2], FIFFV_POINT_CARDINAL, FIFFV_POINT_LPA),
        DigPoint::from_marker(&markers[3], FIFFV_POINT_EXTRA, 4), // vertex
    ];

    // HPI coils
    for (k, marker) in markers.iter().enumerate().skip(4) {
        dig.push(DigPoint::from_marker(marker, FIFFV_POINT_HPI, k as i32 + 1));
    }

    Ok(dig)
}

/// Create measurement info from a parsed mhd header
pub fn mhd_to_info(mhd: MhdHeader) -> Result<MeasInfo> {
    let mut info = MeasInfo::empty(mhd.smpfq);

    info.meas_date = Some(convert_time(&mhd.date, &mhd.time)?);
    info.description = Some(mhd.notes);
    info.subject_info = Some(SubjectInfo {
        first_name: mhd.first_name,
        last_name: mhd.last_name,
        sex: mhd.subinfo.sex,
    });

    let mut lognos = LogicalNumbers::default();
    let mut chs = Vec::with_capacity(mhd.ch.len());
    let mut ch_names = Vec::with_capacity(mhd.ch.len());
    let mut bads = Vec::new();

    for (k, mhd_ch) in mhd.ch.iter().enumerate() {
        ch_names.push(mhd_ch.label.clone());
        if mhd_ch.flag > 0 {
            bads.push(mhd_ch.label.clone());
        }
        chs.push(mhd_channel_to_info(mhd_ch, k as i32 + 1, &mut lognos)?);
    }

    info.chs = chs;
    info.ch_names = ch_names;
    info.bads = bads;

    info.lowpass = Some(mhd.hw_low_fr);
    info.highpass = Some(mhd.hw_hig_fr);

    info.nchan = mhd.nchan;
    info.n_samp = mhd.ntpdata;
    info.n_trials = 1;
    info.start_data = mhd.start_data;
    info.buffer_size_sec = mhd.ntpdata as f64 / mhd.smpfq;

    info.dig = build_dig(&mhd.marker, mhd.num_markers)?;

    if mhd.nsmpl > mhd.sample.len() {
        log::warn!(
            "Header declares {} trigger samples but only {} are present",
            mhd.nsmpl,
            mhd.sample.len()
        );
    }
    info.events = mhd
        .sample
        .iter()
        .take(mhd.nsmpl)
        .map(|s| Event {
            sample: s.start,
            kind: s.type_,
            quality: s.quality,
        })
        .collect();

    info.check_consistency()?;

    log::info!(
        "Measurement info composed: {} channels ({} bad), {} samples at {} Hz",
        info.nchan,
        info.bads.len(),
        info.n_samp,
        info.sfreq
    );

    Ok(info)
}
