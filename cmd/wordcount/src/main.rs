//! Word-count driver
//!
//! Counts words across the input files and appends one `word: count` line
//! per key to `result-<partition>.txt` in the current directory. Output
//! files are opened in append mode, so repeated runs in the same directory
//! accumulate lines; remove the files between runs for fresh counts.
//!
//! Workers and partitions default to 5 and 10 and can be overridden with
//! `MR_NUM_WORKERS` / `MR_NUM_PARTITIONS`.

use mapred::{mrerror, run, EngineConfig, MapContext, ReduceContext};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn map_words(ctx: &MapContext<'_>, path: &Path) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            mrerror!("cannot read {}: {}", path.display(), e);
            return;
        }
    };
    for word in text.split_whitespace() {
        ctx.emit(word, "1");
    }
}

fn reduce_count(ctx: &ReduceContext<'_>, key: &[u8], partition: usize) {
    let mut count: u64 = 0;
    while ctx.next_value(key, partition).is_some() {
        count += 1;
    }

    let name = format!("result-{}.txt", partition);
    let file = OpenOptions::new().create(true).append(true).open(&name);
    match file {
        Ok(mut file) => {
            let _ = writeln!(file, "{}: {}", String::from_utf8_lossy(key), count);
        }
        Err(e) => mrerror!("cannot open {}: {}", name, e),
    }
}

fn main() {
    let inputs: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if inputs.is_empty() {
        eprintln!("usage: wordcount FILE...");
        std::process::exit(2);
    }

    let config = EngineConfig::from_env();
    let start = Instant::now();

    if let Err(e) = run(config, &inputs, map_words, reduce_count) {
        eprintln!("wordcount: {}", e);
        std::process::exit(1);
    }

    println!(
        "Counted {} file(s) in {:?}",
        inputs.len(),
        start.elapsed()
    );
}
