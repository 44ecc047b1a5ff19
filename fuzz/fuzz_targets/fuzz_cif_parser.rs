#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the parser, only produce an error.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(file) = ciftext::parse(text) {
        // Touch every value so span decoding is exercised too.
        for block in file.blocks() {
            for category in block.categories() {
                for (_, field) in category.fields() {
                    for value in field.iter() {
                        let _ = value.len();
                    }
                }
            }
        }

        let _ = ciftext::text::write_file(&file);
    }

    // PDB translation accepts any text.
    let _ = ciftext::pdb::pdb_to_mmcif(text);
});
