// FILE: src/cli/handlers.rs
use crate::{
    cli::ReportFormat, scan, transform_file, InlineError, InlineOptions, Result, ScanReport,
    SOURCE_EXTENSION,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Instant;

/// Where inlined sources are written
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputTarget {
    Stdout,
    File(PathBuf),
    /// Mirror the input tree under this directory
    Directory(PathBuf),
    InPlace,
}

impl OutputTarget {
    fn from_matches(input_path: &Path, matches: &clap::ArgMatches) -> Self {
        if matches.get_flag("in-place") {
            return OutputTarget::InPlace;
        }
        match matches.get_one::<String>("output") {
            Some(output) if input_path.is_dir() => OutputTarget::Directory(PathBuf::from(output)),
            Some(output) => OutputTarget::File(PathBuf::from(output)),
            None => OutputTarget::Stdout,
        }
    }

    fn destination(&self, input_root: &Path, source: &Path) -> Option<PathBuf> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.clone()),
            OutputTarget::Directory(dir) => {
                let relative = source.strip_prefix(input_root).unwrap_or(source);
                Some(dir.join(relative))
            }
            OutputTarget::InPlace => Some(source.to_path_buf()),
        }
    }
}

#[derive(Debug, Default)]
struct InlineSummary {
    total_files: usize,
    error_files: usize,
}

// --- INLINE ---
pub fn handle_inline_command(cli: &super::InlinerCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let recursive = matches.get_flag("recursive");
    let target = OutputTarget::from_matches(&input_path, matches);
    let options = cli.build_inline_options(matches);

    if matches.get_flag("watch") {
        return watch_and_inline(&input_path, recursive, &target, &options);
    }

    let summary = inline_sources(&input_path, recursive, &target, &options)?;
    if summary.error_files > 0 {
        Err(InlineError::invalid_format(format!(
            "{} of {} files failed to inline",
            summary.error_files, summary.total_files
        )))
    } else {
        Ok(())
    }
}

fn inline_sources(
    input_path: &Path,
    recursive: bool,
    target: &OutputTarget,
    options: &InlineOptions,
) -> Result<InlineSummary> {
    let sources = collect_sources(input_path, recursive)?;
    let input_root = if input_path.is_dir() { input_path } else { input_path.parent().unwrap_or(Path::new("")) };
    let quiet = *target == OutputTarget::Stdout;
    let start = Instant::now();
    let mut summary = InlineSummary::default();

    for source in &sources {
        summary.total_files += 1;
        match transform_file(source, options) {
            Ok(inlined) => match target.destination(input_root, source) {
                None => print!("{}", inlined),
                Some(destination) => {
                    write_output(&destination, &inlined)?;
                    println!("✅ {} -> {}", source.display(), destination.display());
                }
            },
            Err(e) => {
                eprintln!("❌ {} - {}", source.display(), e);
                summary.error_files += 1;
            }
        }
    }

    if !quiet && sources.len() > 1 {
        println!("\n📊 Inline Summary:");
        println!("   Total files: {}", summary.total_files);
        println!("   Files with errors: {}", summary.error_files);
        println!("   Time: {}ms", start.elapsed().as_millis());
    }
    log::info!("Inlined {} files in {:?}", summary.total_files - summary.error_files, start.elapsed());

    Ok(summary)
}

fn write_output(destination: &Path, content: &str) -> Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(destination, content)?;
    Ok(())
}

fn watch_and_inline(
    input_path: &Path,
    recursive: bool,
    target: &OutputTarget,
    options: &InlineOptions,
) -> Result<()> {
    // Resources usually sit next to the component, so a single file watches its directory.
    let (watch_root, mode) = if input_path.is_dir() {
        let mode = if recursive { RecursiveMode::Recursive } else { RecursiveMode::NonRecursive };
        (input_path.to_path_buf(), mode)
    } else {
        let parent = input_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        (parent.to_path_buf(), RecursiveMode::NonRecursive)
    };
    eprintln!("👀 Watching {} for changes...", watch_root.display());

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| {
        InlineError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to create file watcher: {}", e),
        ))
    })?;

    watcher.watch(&watch_root, mode).map_err(|e| {
        InlineError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to watch {}: {}", watch_root.display(), e),
        ))
    })?;

    if let Err(e) = inline_sources(input_path, recursive, target, options) {
        eprintln!("❌ Initial run failed: {}", e);
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                if event.kind.is_access() || is_own_output(&event, target) {
                    continue;
                }
                eprintln!("🔄 File changed, inlining again...");
                if let Err(e) = inline_sources(input_path, recursive, target, options) {
                    eprintln!("❌ Inlining failed: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Events caused only by our own writes must not trigger another run
fn is_own_output(event: &Event, target: &OutputTarget) -> bool {
    let output = match target {
        OutputTarget::File(path) | OutputTarget::Directory(path) => path,
        OutputTarget::Stdout | OutputTarget::InPlace => return false,
    };
    let output = fs::canonicalize(output).unwrap_or_else(|_| output.clone());
    !event.paths.is_empty()
        && event
            .paths
            .iter()
            .all(|p| fs::canonicalize(p).unwrap_or_else(|_| p.clone()).starts_with(&output))
}

/// Source files to process: the input itself, or the `.ts` files of a directory
fn collect_sources(input_path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !input_path.is_dir() {
        if !input_path.exists() {
            return Err(InlineError::file_not_found(input_path, "no such file or directory"));
        }
        return Ok(vec![input_path.to_path_buf()]);
    }

    let mut walker = walkdir::WalkDir::new(input_path).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut sources = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            InlineError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if entry.file_type().is_file() {
            if let Some(ext) = entry.path().extension() {
                if ext == SOURCE_EXTENSION {
                    sources.push(entry.into_path());
                }
            }
        }
    }
    Ok(sources)
}

// --- SCAN ---
#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    #[serde(flatten)]
    report: ScanReport,
}

pub fn handle_scan_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let recursive = matches.get_flag("recursive");
    let format = matches.get_one::<ReportFormat>("format").unwrap();

    let reports = scan_sources(&input_path, recursive)?;
    match format {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&reports)
                .map_err(|e| InlineError::invalid_format(format!("JSON serialization error: {}", e)))?;
            println!("{}", json);
        }
        ReportFormat::Text => print_scan_text(&reports),
    }
    Ok(())
}

fn scan_sources(input_path: &Path, recursive: bool) -> Result<Vec<FileReport>> {
    let mut reports = Vec::new();
    for source in collect_sources(input_path, recursive)? {
        let content = fs::read_to_string(&source).map_err(|e| InlineError::file_not_found(&source, e))?;
        reports.push(FileReport {
            path: source.display().to_string(),
            report: scan(&content)?,
        });
    }
    Ok(reports)
}

fn print_scan_text(reports: &[FileReport]) {
    let mut annotation_count = 0;

    for file in reports.iter().filter(|f| !f.report.is_empty()) {
        println!("🔍 {}", file.path);
        for annotation in &file.report.annotations {
            annotation_count += 1;
            let marker = if annotation.commented_out { " (commented out)" } else { "" };
            println!("   {:>4}: {} {}{}", annotation.line, annotation.kind, annotation.urls.join(", "), marker);
        }
    }

    println!("\n📊 Scan Summary:");
    println!("   Files scanned: {}", reports.len());
    println!("   Annotations: {}", annotation_count);
}
