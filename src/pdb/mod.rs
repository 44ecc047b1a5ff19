//! # PDB to mmCIF Translation
//!
//! Reads the fixed-column records of a PDB file and builds a frame shaped
//! like an mmCIF data block:
//!
//! - `entity`: the three generic entities (polymer, non-polymer, water)
//! - `atom_site`: one row per `ATOM  `/`HETATM` record
//! - `cell` and `symmetry`: from the last `CRYST1` record, when present
//!
//! Column values are spans into the PDB text. Only synthesized values (atom
//! serials, entity ids, model numbers, entry ids) are owned strings.
//!
//! ```rust
//! let pdb = "ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N\n";
//! let frame = ciftext::pdb::pdb_to_mmcif(pdb);
//! let atoms = frame.category("atom_site").unwrap();
//! assert_eq!(atoms.field("label_comp_id").unwrap().str(0), "ALA");
//! ```

use indexmap::IndexMap;
use log::{debug, warn};

use crate::data::{CifCategory, CifField, CifFrame};
use crate::text::tokens::{trim, TokenBuilder};

#[cfg(test)]
mod tests;

/// Residue names treated as water.
pub const WATER_NAMES: &[&str] = &[
    "SOL", "WAT", "HOH", "H2O", "W", "DOD", "D3O", "TIP3", "TIP4", "SPC",
];

/// Frame header used when the file has no `HEADER` idCode.
pub const DEFAULT_HEADER: &str = "PDB";

/// Coordinate records shorter than this have no complete Z coordinate.
const MIN_ATOM_RECORD_LEN: usize = 54;

/// One line of the input, without its line terminator.
#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    end: usize,
}

impl Line {
    fn len(&self) -> usize {
        self.end - self.start
    }

    fn text<'a>(&self, data: &'a str) -> &'a str {
        data.get(self.start..self.end).unwrap_or("")
    }

    /// Trimmed span of the 0-based columns `from..to`, clamped to the line.
    fn column(&self, data: &str, from: usize, to: usize) -> (usize, usize) {
        let end = (self.start + to).min(self.end);
        trim(data, (self.start + from).min(end), end)
    }
}

/// Lines of `data`, ending at `\r\n`, `\r` or `\n`.
fn lines(data: &str) -> impl Iterator<Item = Line> + '_ {
    let bytes = data.as_bytes();
    let mut offset = 0;
    std::iter::from_fn(move || {
        if offset >= bytes.len() {
            return None;
        }
        let start = offset;
        let end = bytes[start..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .map_or(bytes.len(), |i| start + i);
        offset = match bytes.get(end) {
            Some(b'\r') if bytes.get(end + 1) == Some(&b'\n') => end + 2,
            Some(_) => end + 1,
            None => end,
        };
        Some(Line { start, end })
    })
}

fn is_coordinate_record(text: &str) -> bool {
    text.starts_with("ATOM  ") || text.starts_with("HETATM")
}

fn entity_id(residue: &str, is_het: bool) -> &'static str {
    if !is_het {
        "1"
    } else if WATER_NAMES.contains(&residue) {
        "3"
    } else {
        "2"
    }
}

/// The first letter of the atom name, as a one-byte span.
fn guess_element(data: &str, (start, end): (usize, usize)) -> (usize, usize) {
    data.as_bytes()
        .get(start..end)
        .and_then(|name| name.iter().position(u8::is_ascii_alphabetic))
        .map_or((start, start), |i| (start + i, start + i + 1))
}

/// Column buffers of the `atom_site` category.
struct AtomSites {
    group_pdb: TokenBuilder,
    id: Vec<String>,
    type_symbol: TokenBuilder,
    atom_id: TokenBuilder,
    alt_id: TokenBuilder,
    comp_id: TokenBuilder,
    asym_id: TokenBuilder,
    entity_id: Vec<&'static str>,
    seq_id: TokenBuilder,
    ins_code: TokenBuilder,
    cartn_x: TokenBuilder,
    cartn_y: TokenBuilder,
    cartn_z: TokenBuilder,
    occupancy: TokenBuilder,
    b_iso: TokenBuilder,
    model_num: Vec<String>,
}

impl AtomSites {
    fn with_capacity(count: usize) -> Self {
        let tokens = || TokenBuilder::with_capacity(count);
        Self {
            group_pdb: tokens(),
            id: Vec::with_capacity(count),
            type_symbol: tokens(),
            atom_id: tokens(),
            alt_id: tokens(),
            comp_id: tokens(),
            asym_id: tokens(),
            entity_id: Vec::with_capacity(count),
            seq_id: tokens(),
            ins_code: tokens(),
            cartn_x: tokens(),
            cartn_y: tokens(),
            cartn_z: tokens(),
            occupancy: tokens(),
            b_iso: tokens(),
            model_num: Vec::with_capacity(count),
        }
    }

    fn add_atom(&mut self, data: &str, line: Line, model: usize, is_het: bool) {
        let push = |tokens: &mut TokenBuilder, (start, end): (usize, usize)| tokens.add(start, end);

        push(&mut self.group_pdb, line.column(data, 0, 6));

        let (start, end) = line.column(data, 6, 11);
        self.id.push(data.get(start..end).unwrap_or("").to_string());

        let atom_name = line.column(data, 12, 16);
        push(&mut self.atom_id, atom_name);
        push(&mut self.alt_id, line.column(data, 16, 17));

        let residue = line.column(data, 17, 20);
        push(&mut self.comp_id, residue);
        push(&mut self.asym_id, line.column(data, 21, 22));
        push(&mut self.seq_id, line.column(data, 22, 26));
        push(&mut self.ins_code, line.column(data, 26, 27));

        push(&mut self.cartn_x, line.column(data, 30, 38));
        push(&mut self.cartn_y, line.column(data, 38, 46));
        push(&mut self.cartn_z, line.column(data, 46, 54));
        push(&mut self.occupancy, line.column(data, 54, 60));
        push(&mut self.b_iso, line.column(data, 60, 66));

        // Columns 73-76 (segment id) are not carried.
        let element = line.column(data, 76, 78);
        if element.0 < element.1 {
            push(&mut self.type_symbol, element);
        } else {
            push(&mut self.type_symbol, guess_element(data, atom_name));
        }

        let residue = data.get(residue.0..residue.1).unwrap_or("");
        self.entity_id.push(entity_id(residue, is_het));
        self.model_num.push(model.to_string());
    }

    fn into_category(self, data: &str) -> CifCategory<'_> {
        let rows = self.id.len();
        let tokens = |t: TokenBuilder| CifField::of_tokens(data, t);

        let fields: IndexMap<String, CifField<'_>> = [
            ("group_PDB", tokens(self.group_pdb)),
            ("id", CifField::of_strings(self.id)),
            ("type_symbol", tokens(self.type_symbol)),
            ("label_atom_id", tokens(self.atom_id.clone())),
            ("label_alt_id", tokens(self.alt_id)),
            ("label_comp_id", tokens(self.comp_id.clone())),
            ("label_asym_id", tokens(self.asym_id.clone())),
            ("label_entity_id", CifField::of_strings(self.entity_id)),
            ("label_seq_id", tokens(self.seq_id.clone())),
            ("pdbx_PDB_ins_code", tokens(self.ins_code)),
            ("Cartn_x", tokens(self.cartn_x)),
            ("Cartn_y", tokens(self.cartn_y)),
            ("Cartn_z", tokens(self.cartn_z)),
            ("occupancy", tokens(self.occupancy)),
            ("B_iso_or_equiv", tokens(self.b_iso)),
            ("auth_seq_id", tokens(self.seq_id)),
            ("auth_comp_id", tokens(self.comp_id)),
            ("auth_asym_id", tokens(self.asym_id)),
            ("auth_atom_id", tokens(self.atom_id)),
            ("pdbx_PDB_model_num", CifField::of_strings(self.model_num)),
        ]
        .into_iter()
        .map(|(name, field)| (name.to_string(), field))
        .collect();

        CifCategory::new("atom_site", rows, fields)
    }
}

fn entity_category() -> CifCategory<'static> {
    let fields = IndexMap::from([
        ("id".to_string(), CifField::of_strings(["1", "2", "3"])),
        (
            "type".to_string(),
            CifField::of_strings(["polymer", "non-polymer", "water"]),
        ),
    ]);
    CifCategory::new("entity", 3, fields)
}

fn single(data: &str, (start, end): (usize, usize)) -> CifField<'_> {
    let mut tokens = TokenBuilder::with_capacity(1);
    tokens.add(start, end);
    CifField::of_tokens(data, tokens)
}

/// `cell` and `symmetry` from a `CRYST1` record.
fn crystal_categories<'a>(
    data: &'a str,
    line: Line,
    entry_id: &str,
) -> [CifCategory<'a>; 2] {
    let entry = || CifField::of_strings([entry_id]);
    let cell = IndexMap::from([
        ("entry_id".to_string(), entry()),
        ("length_a".to_string(), single(data, line.column(data, 6, 15))),
        ("length_b".to_string(), single(data, line.column(data, 15, 24))),
        ("length_c".to_string(), single(data, line.column(data, 24, 33))),
        ("angle_alpha".to_string(), single(data, line.column(data, 33, 40))),
        ("angle_beta".to_string(), single(data, line.column(data, 40, 47))),
        ("angle_gamma".to_string(), single(data, line.column(data, 47, 54))),
        ("Z_PDB".to_string(), single(data, line.column(data, 66, 70))),
    ]);
    let symmetry = IndexMap::from([
        ("entry_id".to_string(), entry()),
        (
            "space_group_name_H-M".to_string(),
            single(data, line.column(data, 55, 66)),
        ),
    ]);
    [
        CifCategory::new("cell", 1, cell),
        CifCategory::new("symmetry", 1, symmetry),
    ]
}

/// Translate PDB text into an mmCIF-shaped frame.
///
/// The frame header is the `HEADER` record's idCode, or [`DEFAULT_HEADER`].
/// Atoms before the first `MODEL` record belong to model 1. Records other
/// than `HEADER`, `CRYST1`, `MODEL`, `ATOM` and `HETATM` are ignored.
pub fn pdb_to_mmcif(data: &str) -> CifFrame<'_> {
    let atom_count = lines(data)
        .filter(|line| is_coordinate_record(line.text(data)))
        .count();

    let mut sites = AtomSites::with_capacity(atom_count);
    let mut header = None;
    let mut cryst1 = None;
    let mut model = 0usize;

    for (index, line) in lines(data).enumerate() {
        let text = line.text(data);
        if is_coordinate_record(text) {
            if model == 0 {
                model = 1;
            }
            if line.len() < MIN_ATOM_RECORD_LEN {
                warn!(
                    "Coordinate record at line {} has only {} columns",
                    index + 1,
                    line.len()
                );
            }
            sites.add_atom(data, line, model, text.starts_with("HETATM"));
        } else if text.starts_with("MODEL ") {
            model += 1;
        } else if text.starts_with("CRYST1") {
            cryst1 = Some(line);
        } else if text.starts_with("HEADER") {
            let (start, end) = line.column(data, 62, 66);
            header = data.get(start..end).filter(|id| !id.is_empty());
        }
    }

    let header = header.unwrap_or(DEFAULT_HEADER);
    let mut frame = CifFrame::new(header);
    frame.push_category(entity_category());
    frame.push_category(sites.into_category(data));
    if let Some(line) = cryst1 {
        for category in crystal_categories(data, line, header) {
            frame.push_category(category);
        }
    }

    debug!(
        "Translated PDB '{}': {} atoms in {} models",
        header,
        atom_count,
        model
    );
    frame
}
