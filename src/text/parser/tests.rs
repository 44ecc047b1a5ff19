use super::*;
use crate::config::ParserConfig;
use crate::data::ValuePresence;
use crate::task::CancellationToken;

const MINIMAL_MMCIF: &str = r#"data_1ABC
#
_entry.id 1ABC
#
_cell.entry_id   1ABC
_cell.length_a   50.000
_cell.length_b   60.000
_symmetry.space_group_name_H-M 'P 21 21 21'
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.Cartn_x
ATOM 1 N   ALA 10.000
ATOM 2 CA  ALA 11.000
HETATM 3 O HOH 12.5
"#;

fn values(category: &crate::data::CifCategory<'_>, field: &str) -> Vec<String> {
    category.field(field).unwrap().to_strings()
}

#[test]
fn test_parse_minimal_mmcif() {
    let file = parse(MINIMAL_MMCIF).unwrap();
    assert_eq!(file.blocks().len(), 1);

    let block = &file.blocks()[0];
    assert_eq!(block.header(), "1ABC");
    assert_eq!(
        block.category_names().collect::<Vec<_>>(),
        vec!["entry", "cell", "symmetry", "atom_site"]
    );

    let cell = block.category("cell").unwrap();
    assert_eq!(cell.row_count(), 1);
    assert_eq!(
        cell.field_names().collect::<Vec<_>>(),
        vec!["entry_id", "length_a", "length_b"]
    );
    assert_eq!(cell.field("length_a").unwrap().float(0), Some(50.0));

    let symmetry = block.category("symmetry").unwrap();
    let sg = symmetry.field("space_group_name_H-M").unwrap();
    assert_eq!(sg.str(0), "P 21 21 21");
    assert!(sg.is_escaped(0));

    let atoms = block.category("atom_site").unwrap();
    assert_eq!(atoms.row_count(), 3);
    assert_eq!(atoms.field_count(), 5);
    assert_eq!(values(atoms, "label_atom_id"), vec!["N", "CA", "O"]);
    assert_eq!(atoms.field("Cartn_x").unwrap().float(2), Some(12.5));
}

#[test]
fn test_single_row_values_in_declaration_order() {
    let input = "data_t\n_a.x 1\n_a.y 'two'\n_a.z\n;three\n;\n";
    let file = parse(input).unwrap();
    let category = file.blocks()[0].category("a").unwrap();

    assert_eq!(category.row_count(), 1);
    let decoded: Vec<_> = category.fields().map(|(_, f)| f.str(0).to_string()).collect();
    assert_eq!(decoded, vec!["1", "two", "three"]);
    assert!(category.fields().all(|(_, f)| f.row_count() == 1));
}

#[test]
fn test_single_row_stops_at_other_namespace() {
    let input = "data_t\n_a.x 1\n_ab.y 2\n_a.z 3\n";
    let file = parse(input).unwrap();
    let block = &file.blocks()[0];
    assert_eq!(block.category_names().collect::<Vec<_>>(), vec!["a", "ab"]);
    // The second `_a` run replaces the first one.
    assert_eq!(
        block.category("a").unwrap().field_names().collect::<Vec<_>>(),
        vec!["z"]
    );
}

#[test]
fn test_name_without_field_part() {
    let file = parse("_x\n;line one\nline two\n;\n").unwrap();
    let block = &file.blocks()[0];
    assert_eq!(block.header(), "");
    let x = block.category("x").unwrap();
    assert_eq!(x.field("").unwrap().str(0), "line one\nline two");
}

#[test]
fn test_expected_value() {
    let err = parse("data_t\n_a.x 1\n_a.y\n_a.z 3\n").unwrap_err();
    assert_eq!(err, ReaderError::Parse(CifParseError::ExpectedValue { line: 4 }));
    assert_eq!(err.line(), 4);
}

#[test]
fn test_expected_value_at_end_of_input() {
    let err = parse("data_t\n_a.x").unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Parse(CifParseError::ExpectedValue { .. })
    ));
}

#[test]
fn test_loop_row_count() {
    let input = "data_t\nloop_\n_p.a\n_p.b\n_p.c\n1 2 3\n4 5 6\n7 8 9\n10 11 12\n";
    let file = parse(input).unwrap();
    let p = file.blocks()[0].category("p").unwrap();
    assert_eq!(p.row_count(), 4);
    assert_eq!(values(p, "b"), vec!["2", "5", "8", "11"]);
}

#[test]
fn test_malformed_loop_reports_loop_line() {
    let input = "data_t\n#\nloop_\n_p.a\n_p.b\n1 2\n3\n_q.x 1\n";
    let err = parse(input).unwrap_err();
    assert_eq!(
        err,
        ReaderError::Parse(CifParseError::MalformedLoopRowCount {
            line: 3,
            values: 3,
            columns: 2
        })
    );
    assert!(err.to_string().contains("loop starting at line 3"));
}

#[test]
fn test_empty_loop() {
    let file = parse("data_t\nloop_\n_p.a\n_p.b\ndata_u\n_q.x 1\n").unwrap();
    let p = file.block("t").unwrap().category("p").unwrap();
    assert_eq!(p.row_count(), 0);
    assert_eq!(p.field_count(), 2);

    let err = parse("data_t\nloop_\n1 2\n").unwrap_err();
    assert_eq!(err, ReaderError::Parse(CifParseError::EmptyLoop { line: 2 }));
}

#[test]
fn test_loop_with_multiline_and_quoted_values() {
    let input = "data_t\nloop_\n_p.id\n_p.text\n1\n;first\nsecond\n;\n2 'quoted value'\n3 .\n4 '.'\n";
    let file = parse(input).unwrap();
    let p = file.blocks()[0].category("p").unwrap();
    assert_eq!(p.row_count(), 4);
    let text = p.field("text").unwrap();
    assert_eq!(text.str(0), "first\nsecond");
    assert_eq!(text.str(1), "quoted value");
    assert_eq!(text.value_presence(2), ValuePresence::NotSpecified);
    assert_eq!(text.str(3), ".");
    assert_eq!(text.value_presence(3), ValuePresence::Present);
}

#[test]
fn test_degenerate_quote() {
    let file = parse("data_t\n_a.x 'a'b' \n").unwrap();
    assert_eq!(file.blocks()[0].category("a").unwrap().field("x").unwrap().str(0), "a'b");
}

#[test]
fn test_keywords_are_case_insensitive() {
    let input = "DATA_One\nLoop_\n_p.a\n1\nSAVE_f\n_q.b 2\nSave_\n";
    let file = parse(input).unwrap();
    let block = file.block("One").unwrap();
    assert!(block.category("p").is_some());
    assert!(block.save_frame("f").unwrap().category("q").is_some());
}

#[test]
fn test_multiple_blocks() {
    let input = "data_first\n_a.x 1\ndata_second\n_b.y 2\n";
    let file = parse(input).unwrap();
    let headers: Vec<_> = file.blocks().iter().map(|b| b.header()).collect();
    assert_eq!(headers, vec!["first", "second"]);
    assert!(file.block("first").unwrap().category("b").is_none());
}

#[test]
fn test_empty_blocks_are_dropped() {
    let file = parse("data_empty\ndata_full\n_a.x 1\ndata_trailing\n").unwrap();
    let headers: Vec<_> = file.blocks().iter().map(|b| b.header()).collect();
    assert_eq!(headers, vec!["full"]);
}

#[test]
fn test_empty_document() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("# only a comment\n\n").unwrap().is_empty());
}

#[test]
fn test_save_frames() {
    let input = "data_dict\n_dictionary.title test\nsave_first\n_item.name a\nsave_\nsave_empty\nsave_\nsave_second\nloop_\n_enum.value\nx\ny\nsave_\n_after.v 1\n";
    let file = parse(input).unwrap();
    let block = &file.blocks()[0];

    assert_eq!(block.category_names().collect::<Vec<_>>(), vec!["dictionary", "after"]);
    let headers: Vec<_> = block.save_frames().iter().map(|f| f.header()).collect();
    assert_eq!(headers, vec!["first", "second"]);
    assert_eq!(
        block.save_frame("second").unwrap().category("enum").unwrap().row_count(),
        2
    );
}

#[test]
fn test_block_with_only_save_frames_is_dropped_at_next_header() {
    let input = "data_a\nsave_f\n_x.y 1\nsave_\ndata_b\n_z.w 2\n";
    let file = parse(input).unwrap();
    let headers: Vec<_> = file.blocks().iter().map(|b| b.header()).collect();
    assert_eq!(headers, vec!["b"]);
    assert!(file.blocks()[0].save_frames().is_empty());
}

#[test]
fn test_last_block_with_only_save_frames_is_kept() {
    let input = "data_a\n_z.w 2\ndata_b\nsave_f\n_x.y 1\nsave_\n";
    let file = parse(input).unwrap();
    let headers: Vec<_> = file.blocks().iter().map(|b| b.header()).collect();
    assert_eq!(headers, vec!["a", "b"]);
    assert_eq!(file.blocks()[1].save_frames().len(), 1);
    assert!(file.blocks()[1].frame().is_empty());
}

#[test]
fn test_nested_save_frame() {
    let input = "data_d\nsave_A\n_x.y 1\nsave_B\n_x.z 2\nsave_\nsave_\n";
    let err = parse(input).unwrap_err();
    assert_eq!(err, ReaderError::Parse(CifParseError::NestedSaveFrame { line: 4 }));
}

#[test]
fn test_unterminated_save_frame() {
    let err = parse("data_d\nsave_A\n_x.y 1\n").unwrap_err();
    match err {
        ReaderError::Parse(CifParseError::UnterminatedSaveFrame { header, .. }) => {
            assert_eq!(header, "A");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_data_block_inside_save_frame() {
    let err = parse("data_d\nsave_A\n_x.y 1\ndata_e\n").unwrap_err();
    assert_eq!(
        err,
        ReaderError::Parse(CifParseError::DataBlockInsideSaveFrame { line: 4 })
    );
}

#[test]
fn test_stray_save_end_is_ignored() {
    let file = parse("data_a\n_x.y 1\nsave_\n_z.w 2\n").unwrap();
    let block = &file.blocks()[0];
    assert_eq!(block.category_names().collect::<Vec<_>>(), vec!["x", "z"]);
    assert!(block.save_frames().is_empty());
}

#[test]
fn test_stray_save_end_does_not_repeat_a_closed_frame() {
    let file = parse("data_a\n_x.y 1\nsave_f\n_q.r 1\nsave_\nsave_\n").unwrap();
    assert_eq!(file.blocks()[0].save_frames().len(), 1);
}

#[test]
fn test_unexpected_token() {
    let err = parse("data_d\n_x.y 1 2\n").unwrap_err();
    assert_eq!(
        err,
        ReaderError::Parse(CifParseError::UnexpectedToken {
            token: "2".to_string(),
            line: 2
        })
    );
}

#[test]
fn test_comments_are_transparent() {
    let plain = "data_t\n_a.x 1\nloop_\n_b.y\n_b.z\n1 2\n3 4\n";
    let commented = "# head\ndata_t # c\n_a.x # c\n1\n# c\nloop_\n# c\n_b.y\n_b.z # c\n1 # c\n2\n3 4 # c\n# tail";
    assert_eq!(parse(plain).unwrap().blocks().len(), 1);

    let a = parse(plain).unwrap();
    let b = parse(commented).unwrap();
    let a_block = &a.blocks()[0];
    let b_block = &b.blocks()[0];
    assert_eq!(
        a_block.category_names().collect::<Vec<_>>(),
        b_block.category_names().collect::<Vec<_>>()
    );
    for category in a_block.categories() {
        let other = b_block.category(category.name()).unwrap();
        for (name, field) in category.fields() {
            assert_eq!(field.to_strings(), other.field(name).unwrap().to_strings());
        }
    }
}

#[test]
fn test_spans_point_into_source() {
    let input = "data_t\n_a.x value\n";
    let file = parse(input).unwrap();
    let field = file.blocks()[0].category("a").unwrap().field("x").unwrap();
    let (start, end) = field.span(0).unwrap();
    assert_eq!(&input[start..end], "value");
}

fn synthetic_loop(rows: usize) -> String {
    let mut text = String::from("data_big\nloop_\n_v.a\n_v.b\n");
    for i in 0..rows {
        text.push_str(&format!("{i} x\n"));
    }
    text
}

#[test]
fn test_small_chunks_give_same_result() {
    let text = synthetic_loop(1_000);
    let mut ctx = RuntimeContext::new(ParserConfig::default().with_chunk_size(7));
    let chunked = parse_with(&text, &mut ctx).unwrap();
    let whole = parse(&text).unwrap();
    assert_eq!(chunked, whole);
    assert_eq!(chunked.blocks()[0].category("v").unwrap().row_count(), 1_000);
}

#[test]
fn test_progress_reports() {
    let text = synthetic_loop(2_000);
    let mut seen = Vec::new();
    {
        let config = ParserConfig::default()
            .with_chunk_size(500)
            .with_progress_interval(std::time::Duration::ZERO);
        let mut ctx = RuntimeContext::new(config).with_observer(|p| seen.push((p.current, p.max)));
        parse_with(&text, &mut ctx).unwrap();
    }

    assert_eq!(seen.first(), Some(&(0, text.len())));
    assert_eq!(seen.last(), Some(&(text.len(), text.len())));
    // 4000 values in chunks of 500 give 8 full chunks.
    assert_eq!(seen.len(), 2 + 8);
    assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[test]
fn test_cancellation_mid_loop() {
    let text = synthetic_loop(500_000);
    let token = CancellationToken::new();
    let observer_token = token.clone();
    let mut reports = 0usize;

    let err = {
        let config = ParserConfig::default()
            .with_chunk_size(1_000)
            .with_progress_interval(std::time::Duration::ZERO);
        let mut ctx = RuntimeContext::new(config)
            .with_cancellation(token.clone())
            .with_observer(|p| {
                reports += 1;
                if p.current > 0 {
                    observer_token.cancel();
                }
            });
        parse_with(&text, &mut ctx).unwrap_err()
    };

    assert!(err.is_aborted());
    match err {
        ReaderError::Aborted { source, .. } => {
            assert!(source.current > 0);
            assert!(source.current < text.len());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // One report at the start, one at the first chunk boundary.
    assert_eq!(reports, 2);
}

#[test]
fn test_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    let mut ctx = RuntimeContext::default().with_cancellation(token);
    let err = parse_with(MINIMAL_MMCIF, &mut ctx).unwrap_err();
    assert_eq!(err.line(), 1);
    assert!(err.is_aborted());
}
