use super::*;
use crate::data::{CifBlock, CifFile};
use crate::text::{parse, write_file};

#[allow(clippy::too_many_arguments)]
fn atom_line(
    record: &str,
    serial: u32,
    name: &str,
    residue: &str,
    chain: char,
    seq: i32,
    xyz: [f64; 3],
    element: &str,
) -> String {
    format!(
        "{record:<6}{serial:>5} {name:<4} {residue:>3} {chain}{seq:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {element:>2}",
        xyz[0], xyz[1], xyz[2], 1.0, 20.0
    )
}

fn header_line(id: &str) -> String {
    format!("HEADER    {:<40}{:<9}   {:<4}", "HYDROLASE", "01-JAN-00", id)
}

fn cryst1_line() -> String {
    format!(
        "CRYST1{:>9.3}{:>9.3}{:>9.3}{:>7.2}{:>7.2}{:>7.2} {:<11}{:>4}",
        50.0, 60.0, 70.0, 90.0, 90.0, 90.0, "P 21 21 21", 4
    )
}

fn sample_pdb() -> String {
    [
        header_line("1ABC"),
        cryst1_line(),
        atom_line("ATOM", 1, " N", "ALA", 'A', 1, [11.104, 6.134, -6.504], "N"),
        atom_line("ATOM", 2, " CA", "ALA", 'A', 1, [11.639, 6.071, -5.147], ""),
        atom_line("HETATM", 3, " O", "HOH", 'A', 101, [1.0, 2.0, 3.0], "O"),
        atom_line("HETATM", 4, "ZN", "ZN", 'A', 102, [4.0, 5.0, 6.0], "ZN"),
        "END".to_string(),
    ]
    .join("\n")
}

fn strings(frame: &CifFrame<'_>, category: &str, field: &str) -> Vec<String> {
    frame
        .category(category)
        .unwrap()
        .field(field)
        .unwrap()
        .to_strings()
}

#[test]
fn test_atom_site_columns() {
    let pdb = sample_pdb();
    let frame = pdb_to_mmcif(&pdb);

    let atoms = frame.category("atom_site").unwrap();
    assert_eq!(atoms.row_count(), 4);
    assert!(atoms.fields().all(|(_, f)| f.row_count() == 4));

    assert_eq!(
        strings(&frame, "atom_site", "group_PDB"),
        vec!["ATOM", "ATOM", "HETATM", "HETATM"]
    );
    assert_eq!(strings(&frame, "atom_site", "id"), vec!["1", "2", "3", "4"]);
    assert_eq!(
        strings(&frame, "atom_site", "label_atom_id"),
        vec!["N", "CA", "O", "ZN"]
    );
    assert_eq!(
        strings(&frame, "atom_site", "auth_seq_id"),
        vec!["1", "1", "101", "102"]
    );
    assert_eq!(
        strings(&frame, "atom_site", "label_asym_id"),
        strings(&frame, "atom_site", "auth_asym_id")
    );

    let x = atoms.field("Cartn_x").unwrap();
    assert_eq!(x.float(1), Some(11.639));
    assert_eq!(atoms.field("Cartn_z").unwrap().float(0), Some(-6.504));
    assert_eq!(atoms.field("occupancy").unwrap().float(2), Some(1.0));
    assert_eq!(atoms.field("B_iso_or_equiv").unwrap().float(3), Some(20.0));
    assert_eq!(strings(&frame, "atom_site", "label_alt_id"), vec!["", "", "", ""]);
    assert_eq!(
        strings(&frame, "atom_site", "pdbx_PDB_ins_code"),
        vec!["", "", "", ""]
    );
}

#[test]
fn test_element_and_entity() {
    let pdb = sample_pdb();
    let frame = pdb_to_mmcif(&pdb);

    // Row 1 has blank element columns; the symbol is guessed from " CA ".
    assert_eq!(
        strings(&frame, "atom_site", "type_symbol"),
        vec!["N", "C", "O", "ZN"]
    );
    assert_eq!(
        strings(&frame, "atom_site", "label_entity_id"),
        vec!["1", "1", "3", "2"]
    );

    let entity = frame.category("entity").unwrap();
    assert_eq!(entity.row_count(), 3);
    assert_eq!(strings(&frame, "entity", "type"), vec!["polymer", "non-polymer", "water"]);
}

#[test]
fn test_header_and_crystal() {
    let pdb = sample_pdb();
    let frame = pdb_to_mmcif(&pdb);

    assert_eq!(frame.header(), "1ABC");
    assert_eq!(
        frame.category_names().collect::<Vec<_>>(),
        vec!["entity", "atom_site", "cell", "symmetry"]
    );

    let cell = frame.category("cell").unwrap();
    assert_eq!(cell.row_count(), 1);
    assert_eq!(cell.field("entry_id").unwrap().str(0), "1ABC");
    assert_eq!(cell.field("length_a").unwrap().float(0), Some(50.0));
    assert_eq!(cell.field("length_c").unwrap().float(0), Some(70.0));
    assert_eq!(cell.field("angle_gamma").unwrap().float(0), Some(90.0));
    assert_eq!(cell.field("Z_PDB").unwrap().int(0), Some(4));

    let symmetry = frame.category("symmetry").unwrap();
    assert_eq!(symmetry.field("space_group_name_H-M").unwrap().str(0), "P 21 21 21");
}

#[test]
fn test_models() {
    let pdb = [
        "MODEL        1".to_string(),
        atom_line("ATOM", 1, " N", "GLY", 'A', 1, [0.0, 0.0, 0.0], "N"),
        atom_line("ATOM", 2, " CA", "GLY", 'A', 1, [1.0, 0.0, 0.0], "C"),
        "ENDMDL".to_string(),
        "MODEL        2".to_string(),
        atom_line("ATOM", 1, " N", "GLY", 'A', 1, [0.1, 0.0, 0.0], "N"),
        atom_line("ATOM", 2, " CA", "GLY", 'A', 1, [1.1, 0.0, 0.0], "C"),
        "ENDMDL".to_string(),
    ]
    .join("\n");
    let frame = pdb_to_mmcif(&pdb);

    assert_eq!(
        strings(&frame, "atom_site", "pdbx_PDB_model_num"),
        vec!["1", "1", "2", "2"]
    );
}

#[test]
fn test_atoms_without_model_record_are_model_one() {
    let pdb = atom_line("ATOM", 1, " N", "GLY", 'A', 1, [0.0, 0.0, 0.0], "N");
    let frame = pdb_to_mmcif(&pdb);
    assert_eq!(strings(&frame, "atom_site", "pdbx_PDB_model_num"), vec!["1"]);
}

#[test]
fn test_defaults_without_header_or_crystal() {
    let frame = pdb_to_mmcif("REMARK   1 nothing here\nEND\n");
    assert_eq!(frame.header(), DEFAULT_HEADER);
    assert_eq!(frame.category("atom_site").unwrap().row_count(), 0);
    assert!(frame.category("cell").is_none());
    assert!(frame.category("symmetry").is_none());
}

#[test]
fn test_short_records_keep_columns_aligned() {
    let frame = pdb_to_mmcif("ATOM      1  N   ALA A   1\nATOM      2  CA  ALA A   1      11.639\n");
    let atoms = frame.category("atom_site").unwrap();
    assert_eq!(atoms.row_count(), 2);
    assert!(atoms.fields().all(|(_, f)| f.row_count() == 2));
    assert_eq!(strings(&frame, "atom_site", "Cartn_x"), vec!["", "11.639"]);
    assert_eq!(strings(&frame, "atom_site", "Cartn_y"), vec!["", ""]);
}

#[test]
fn test_crlf_line_endings() {
    let pdb = sample_pdb().replace('\n', "\r\n");
    let frame = pdb_to_mmcif(&pdb);
    assert_eq!(frame.header(), "1ABC");
    assert_eq!(
        strings(&frame, "atom_site", "type_symbol"),
        vec!["N", "C", "O", "ZN"]
    );
}

#[test]
fn test_cr_line_endings() {
    let pdb = sample_pdb().replace('\n', "\r");
    let frame = pdb_to_mmcif(&pdb);
    assert_eq!(frame.header(), "1ABC");
    assert_eq!(
        strings(&frame, "atom_site", "type_symbol"),
        vec!["N", "C", "O", "ZN"]
    );
    assert_eq!(
        strings(&frame, "atom_site", "Cartn_x"),
        strings(&pdb_to_mmcif(&sample_pdb()), "atom_site", "Cartn_x")
    );
}

#[test]
fn test_translated_frame_survives_cif_round_trip() {
    let pdb = sample_pdb();
    let frame = pdb_to_mmcif(&pdb);
    let file = CifFile::new(vec![CifBlock::new(frame.clone(), Vec::new())]);

    let text = write_file(&file);
    let reparsed = parse(&text).unwrap();
    let block = reparsed.block("1ABC").unwrap();

    for category in frame.categories() {
        let other = block.category(category.name()).unwrap();
        assert_eq!(other.row_count(), category.row_count());
        for (name, field) in category.fields() {
            assert_eq!(
                other.field(name).unwrap().to_strings(),
                field.to_strings(),
                "{}.{}",
                category.name(),
                name
            );
        }
    }
}
