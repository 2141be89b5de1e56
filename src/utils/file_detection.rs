use mime_guess::mime;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Number of leading bytes inspected for NUL bytes.
const PROBE_LEN: usize = 1024;

/// Extensions treated as source code. A binary-classified file with one of
/// these extensions is still included (as a binary marker) when binary files
/// are otherwise excluded.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "c", "cpp", "h", "hpp", "cs", "php", "rb", "go", "rs",
    "swift", "kt", "scala", "clj", "hs", "ml", "r", "m", "pl", "sh", "bat", "ps1", "html", "htm",
    "css", "scss", "sass", "less", "xml", "json", "yaml", "yml", "toml", "ini", "cfg", "conf",
    "sql", "md", "rst", "txt", "dart", "vue", "svelte", "elm", "ex", "exs", "erl",
];

/// Determines if a file should be treated as binary.
///
/// A `text/*` MIME type guessed from the extension wins without touching the
/// file. Otherwise the first bytes are probed for NUL. Any I/O failure counts
/// as binary.
pub fn is_binary(path: &Path) -> bool {
    if let Some(guess) = mime_guess::from_path(path).first() {
        if guess.type_() == mime::TEXT {
            return false;
        }
    }

    match probe_for_nul(path) {
        Ok(has_nul) => has_nul,
        Err(e) => {
            tracing::debug!("Treating {} as binary, probe failed: {}", path.display(), e);
            true
        }
    }
}

/// Returns `true` when the extension is in the code allowlist.
pub fn is_code_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            CODE_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

fn probe_for_nul(path: &Path) -> std::io::Result<bool> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file).take(PROBE_LEN as u64);
    let mut buffer = Vec::with_capacity(PROBE_LEN);
    reader.read_to_end(&mut buffer)?;
    Ok(buffer.contains(&0))
}
