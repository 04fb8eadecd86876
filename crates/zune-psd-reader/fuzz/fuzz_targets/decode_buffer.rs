#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let decoder = zune_psd_reader::PSDDecoder::new(data);

    if let Ok(document) = decoder.decode() {
        let _ = document.pixels();

        for layer in document.layers() {
            for channel in &layer.channels {
                let _ = channel.decompress(data);
            }
        }
    }
});
