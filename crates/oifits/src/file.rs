//! The OIFITS file aggregate: owns every table and indexes them by the
//! identifiers data tables use to reference each other.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::meta::ReferenceResolver;
use crate::table::{ColumnData, HeaderCard, Table, TableId, TableKind};

/// Per (target, instrument) aggregate computed by [`OiFitsFile::analyze`].
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSummary {
    pub target_name: String,
    pub ra: f64,
    pub dec: f64,
    /// Shortest integration time of the contributing rows.
    pub t_exptime: f64,
    pub t_min: f64,
    pub t_max: f64,
    /// Mean resolving power `EFF_WAVE / EFF_BAND` of the instrument.
    pub res_power: f64,
    pub em_min: f64,
    pub em_max: f64,
    pub facility_name: String,
    pub instrument_name: String,
    pub nb_vis: usize,
    pub nb_vis2: usize,
    pub nb_t3: usize,
    pub nb_channels: usize,
}

/// Derived, read-only view of a file's contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub summaries: Vec<TargetSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct OiFitsFile {
    absolute_path: Option<PathBuf>,
    /// Cards of the primary HDU, which is not an OIFITS table.
    pub primary_cards: Vec<HeaderCard>,
    tables: IndexMap<TableId, Table>,
    arr_name_index: IndexMap<String, Vec<TableId>>,
    ins_name_index: IndexMap<String, Vec<TableId>>,
    corr_name_index: IndexMap<String, Vec<TableId>>,
    oi_target: Option<TableId>,
    next_id: u64,
    analysis: OnceCell<Analysis>,
}

impl OiFitsFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        OiFitsFile {
            absolute_path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    pub fn absolute_path(&self) -> Option<&Path> {
        self.absolute_path.as_deref()
    }

    pub fn set_absolute_path<P: AsRef<Path>>(&mut self, path: P) {
        self.absolute_path = Some(path.as_ref().to_path_buf());
    }

    /// Register a table, assigning its ext number and per-kind ext version.
    ///
    /// The ext number is the count of tables currently registered, so after
    /// [`remove_data_table`](Self::remove_data_table) a new table may get the
    /// same ext number as a table still in the file. [`TableId`]s are never
    /// reused and remain the stable handle.
    pub fn add_table(&mut self, mut table: Table) -> Result<TableId> {
        if table.kind == TableKind::Target && self.oi_target.is_some() {
            return Err(Error::DuplicateTarget);
        }

        table.ext_number = self.tables.len();
        table.ext_version = 1 + self.tables.values().filter(|t| t.kind == table.kind).count();

        let id = TableId(self.next_id);
        self.next_id += 1;

        match table.kind {
            TableKind::Target => self.oi_target = Some(id),
            TableKind::Array => {
                Self::register(&mut self.arr_name_index, table.arr_name(), id, &table, "ARRNAME")
            }
            TableKind::Wavelength => {
                Self::register(&mut self.ins_name_index, table.ins_name(), id, &table, "INSNAME")
            }
            TableKind::Corr => {
                Self::register(&mut self.corr_name_index, table.corr_name(), id, &table, "CORRNAME")
            }
            _ => {}
        }

        log::debug!(
            "Registered {} table #{} (EXTVER={})",
            table.ext_name(),
            table.ext_number,
            table.ext_version
        );
        self.tables.insert(id, table);
        self.analysis.take();
        Ok(id)
    }

    fn register(
        index: &mut IndexMap<String, Vec<TableId>>,
        name: Option<&str>,
        id: TableId,
        table: &Table,
        keyword: &str,
    ) {
        match name {
            Some(name) => index.entry(name.to_string()).or_default().push(id),
            None => log::warn!("{keyword} of {} table is missing", table.ext_name()),
        }
    }

    /// Remove an OI_VIS, OI_VIS2 or OI_T3 table. Indexes are left untouched.
    pub fn remove_data_table(&mut self, id: TableId) -> Result<Table> {
        let table = self.tables.get(&id).ok_or(Error::UnknownTable(id))?;
        if !table.kind.is_removable() {
            return Err(Error::NotADataTable(table.ext_name().to_string()));
        }
        self.analysis.take();
        let table = self.tables.shift_remove(&id).ok_or(Error::UnknownTable(id))?;
        log::debug!("Unregistered {} table #{}", table.ext_name(), table.ext_number);
        Ok(table)
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    /// Tables in insertion order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_ids(&self) -> impl Iterator<Item = TableId> + '_ {
        self.tables.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn tables_of_kind<'a>(
        &'a self,
        kind: &'a TableKind,
    ) -> impl Iterator<Item = &'a Table> + 'a {
        self.tables.values().filter(move |t| &t.kind == kind)
    }

    pub fn data_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values().filter(|t| t.kind.is_data())
    }

    pub fn oi_target(&self) -> Option<&Table> {
        self.oi_target.and_then(|id| self.tables.get(&id))
    }

    fn first_indexed(&self, index: &IndexMap<String, Vec<TableId>>, name: &str) -> Option<&Table> {
        index
            .get(name.trim())
            .and_then(|ids| ids.first())
            .and_then(|id| self.tables.get(id))
    }

    pub fn get_oi_array(&self, arr_name: &str) -> Option<&Table> {
        self.first_indexed(&self.arr_name_index, arr_name)
    }

    pub fn get_oi_wavelength(&self, ins_name: &str) -> Option<&Table> {
        self.first_indexed(&self.ins_name_index, ins_name)
    }

    pub fn get_oi_corr(&self, corr_name: &str) -> Option<&Table> {
        self.first_indexed(&self.corr_name_index, corr_name)
    }

    pub fn accepted_arr_names(&self) -> Vec<String> {
        self.arr_name_index.keys().cloned().collect()
    }

    pub fn accepted_ins_names(&self) -> Vec<String> {
        self.ins_name_index.keys().cloned().collect()
    }

    pub fn accepted_corr_names(&self) -> Vec<String> {
        self.corr_name_index.keys().cloned().collect()
    }

    /// Identifier indexes as `(EXTNAME, identifier keyword, index)`, for the
    /// duplicate check.
    pub(crate) fn indexes(
        &self,
    ) -> [(&'static str, &'static str, &IndexMap<String, Vec<TableId>>); 3] {
        [
            ("OI_ARRAY", "ARRNAME", &self.arr_name_index),
            ("OI_WAVELENGTH", "INSNAME", &self.ins_name_index),
            ("OI_CORR", "CORRNAME", &self.corr_name_index),
        ]
    }

    /// Per-target summaries used by the CSV view. Computed on first call
    /// and cached until the file changes.
    pub fn analyze(&self) -> &Analysis {
        self.analysis.get_or_init(|| self.compute_analysis())
    }

    fn compute_analysis(&self) -> Analysis {
        let Some(target) = self.oi_target() else {
            return Analysis::default();
        };
        let ids = target.target_ids().unwrap_or_default();
        let names = target.column("TARGET").and_then(ColumnData::as_char);
        let ra = target.column("RAEP0").and_then(ColumnData::to_f64_vec);
        let dec = target.column("DECEP0").and_then(ColumnData::to_f64_vec);

        let mut instruments: Vec<&str> = Vec::new();
        for table in self.data_tables() {
            if let Some(ins) = table.ins_name() {
                if !instruments.contains(&ins) {
                    instruments.push(ins);
                }
            }
        }

        let mut summaries = Vec::new();
        for (row, &target_id) in ids.iter().enumerate() {
            let target_name = names
                .and_then(|n| n.iter().nth(row))
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            let value_at = |col: &Option<Vec<f64>>| {
                col.as_ref().and_then(|v| v.get(row).copied()).unwrap_or(f64::NAN)
            };

            for &ins in &instruments {
                if let Some(summary) = self.summarize(target_id, ins) {
                    summaries.push(TargetSummary {
                        target_name: target_name.clone(),
                        ra: value_at(&ra),
                        dec: value_at(&dec),
                        ..summary
                    });
                }
            }
        }
        Analysis { summaries }
    }

    /// Aggregate the rows of every data table observing `target_id` with
    /// instrument `ins`. Target name and coordinates are left empty.
    fn summarize(&self, target_id: i32, ins: &str) -> Option<TargetSummary> {
        let mut summary = TargetSummary {
            target_name: String::new(),
            ra: f64::NAN,
            dec: f64::NAN,
            t_exptime: f64::INFINITY,
            t_min: f64::INFINITY,
            t_max: f64::NEG_INFINITY,
            res_power: f64::NAN,
            em_min: f64::NAN,
            em_max: f64::NAN,
            facility_name: String::new(),
            instrument_name: ins.to_string(),
            nb_vis: 0,
            nb_vis2: 0,
            nb_t3: 0,
            nb_channels: 0,
        };
        let mut contributing = false;

        for table in self.data_tables().filter(|t| t.ins_name() == Some(ins)) {
            let Some(ids) = table.target_ids() else {
                continue;
            };
            let mjd = table.column("MJD").and_then(ColumnData::to_f64_vec);
            let int_time = table.column("INT_TIME").and_then(ColumnData::to_f64_vec);
            let rows: Vec<usize> = ids
                .iter()
                .enumerate()
                .filter(|(_, &id)| id == target_id)
                .map(|(row, _)| row)
                .collect();
            if rows.is_empty() {
                continue;
            }
            if !contributing {
                summary.facility_name = table.arr_name().unwrap_or_default().to_string();
                contributing = true;
            }

            match table.kind {
                TableKind::Vis => summary.nb_vis += rows.len(),
                TableKind::Vis2 => summary.nb_vis2 += rows.len(),
                TableKind::T3 => summary.nb_t3 += rows.len(),
                _ => {}
            }
            for &row in &rows {
                if let Some(&v) = mjd.as_ref().and_then(|m| m.get(row)) {
                    summary.t_min = summary.t_min.min(v);
                    summary.t_max = summary.t_max.max(v);
                }
                if let Some(&v) = int_time.as_ref().and_then(|t| t.get(row)) {
                    summary.t_exptime = summary.t_exptime.min(v);
                }
            }
        }
        if !contributing {
            return None;
        }

        for value in [&mut summary.t_exptime, &mut summary.t_min, &mut summary.t_max] {
            if value.is_infinite() {
                *value = f64::NAN;
            }
        }

        if let Some(wavelength) = self.get_oi_wavelength(ins) {
            summary.nb_channels = wavelength.row_count;
            let waves = wavelength.eff_wave().unwrap_or_default();
            let bands = wavelength.eff_band().unwrap_or_default();
            if let Some((lo, hi)) = min_max(&waves) {
                summary.em_min = lo;
                summary.em_max = hi;
            }
            let ratios: Vec<f64> = waves
                .iter()
                .zip(&bands)
                .filter(|(_, &band)| band != 0.0)
                .map(|(wave, band)| wave / band)
                .collect();
            if !ratios.is_empty() {
                summary.res_power = ratios.iter().sum::<f64>() / ratios.len() as f64;
            }
        }
        Some(summary)
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

impl ReferenceResolver for OiFitsFile {
    fn accepted_ins_names(&self) -> Vec<String> {
        OiFitsFile::accepted_ins_names(self)
    }

    fn accepted_arr_names(&self) -> Vec<String> {
        OiFitsFile::accepted_arr_names(self)
    }

    fn accepted_corr_names(&self) -> Vec<String> {
        OiFitsFile::accepted_corr_names(self)
    }

    fn accepted_sta_indexes(&self, table: &Table) -> Option<Vec<i32>> {
        let array = self.get_oi_array(table.arr_name()?)?;
        array.sta_indexes().map(|s| s.iter().copied().collect())
    }

    fn accepted_target_ids(&self) -> Option<Vec<i32>> {
        self.oi_target()?.target_ids()
    }

    fn nwave(&self, table: &Table) -> Option<usize> {
        if table.kind == TableKind::Inspol {
            // One Jones matrix table may span several instruments.
            let names = table.column("INSNAME").and_then(ColumnData::as_char)?;
            return names
                .iter()
                .filter_map(|name| self.get_oi_wavelength(name))
                .map(|w| w.row_count)
                .max();
        }
        table
            .ins_name()
            .and_then(|ins| self.get_oi_wavelength(ins))
            .map(|w| w.row_count)
    }

    fn nstations(&self, table: &Table) -> Option<usize> {
        table
            .arr_name()
            .and_then(|arr| self.get_oi_array(arr))
            .map(|a| a.row_count)
    }
}
