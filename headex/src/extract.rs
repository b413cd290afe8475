//! Gathering of a world's files and the worker fan-out across them.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;

use flate2::read::GzDecoder;
use log::warn;
use memmap2::Mmap;
use walkdir::WalkDir;

use crate::nbt;
use crate::region::Region;
use crate::scan::{scan_tag, scan_text};
use crate::validate::validate;
use crate::{Error, Result};

/// Which parts of a world to scan. The default scans everything.
#[derive(Debug, Clone)]
pub struct Options {
    /// Heads carried by entities (`entities/*.mca`).
    pub entities: bool,
    /// Heads placed in the world and in containers (`region/*.mca`).
    pub region: bool,
    /// Heads in player inventories (`playerdata/*.dat` and `level.dat`).
    pub player_data: bool,
    /// Profiles in `.json`/`.mcfunction` files under `datapacks/`, including
    /// inside zip-packaged data packs.
    pub data_packs: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            entities: true,
            region: true,
            player_data: true,
            data_packs: true,
        }
    }
}

/// One unit of work for the pool.
enum Job {
    Mca(PathBuf),
    Dat(PathBuf),
    PackDir(PathBuf),
    PackZip(PathBuf),
}

impl Job {
    fn path(&self) -> &Path {
        match self {
            Job::Mca(p) | Job::Dat(p) | Job::PackDir(p) | Job::PackZip(p) => p,
        }
    }
}

/// Extract player head profiles from the given worlds.
///
/// Each region file, player data file, and data pack becomes its own unit of
/// work on a bounded pool. A file that fails to read or decode is logged and
/// the run carries on without it; only failing to list a directory at all
/// aborts. Returns the deduplicated set of validated profile strings.
pub fn extract_heads(worlds: &[PathBuf], opts: &Options) -> Result<HashSet<String>> {
    let heads = Mutex::new(HashSet::new());

    if !(opts.entities || opts.region || opts.player_data || opts.data_packs) {
        return Ok(heads.into_inner().unwrap());
    }

    let mut jobs = Vec::new();
    for world in worlds {
        gather_world(world, opts, &mut jobs)?;
    }

    // Leave a core for whoever launched us.
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(Error::ThreadPool)?;

    let heads_ref = &heads;
    pool.scope(|s| {
        for job in &jobs {
            s.spawn(move |_| {
                let mut consider = |token: &str| {
                    if validate(token) {
                        heads_ref.lock().unwrap().insert(token.to_owned());
                    }
                };

                let result = match job {
                    Job::Mca(path) => process_mca(path, &mut consider),
                    Job::Dat(path) => process_dat(path, &mut consider),
                    Job::PackDir(path) => process_pack_dir(path, &mut consider),
                    Job::PackZip(path) => process_pack_zip(path, &mut consider),
                };

                if let Err(e) = result {
                    warn!("unable to fully process {}: {}", job.path().display(), e);
                }
            });
        }
    });

    Ok(heads.into_inner().unwrap())
}

fn gather_world(world: &Path, opts: &Options, jobs: &mut Vec<Job>) -> Result<()> {
    if opts.entities {
        gather_archives(&world.join("entities"), jobs)?;
    }
    if opts.region {
        gather_archives(&world.join("region"), jobs)?;
    }

    if opts.player_data {
        let playerdata = world.join("playerdata");
        if playerdata.is_dir() {
            for entry in std::fs::read_dir(&playerdata)? {
                let path = entry?.path();
                if is_data_file(&path, "dat") {
                    jobs.push(Job::Dat(path));
                }
            }
        }

        let level = world.join("level.dat");
        if level.is_file() {
            jobs.push(Job::Dat(level));
        }
    }

    if opts.data_packs {
        let datapacks = world.join("datapacks");
        if datapacks.is_dir() {
            for entry in std::fs::read_dir(&datapacks)? {
                let path = entry?.path();
                if path.is_dir() {
                    jobs.push(Job::PackDir(path));
                } else if is_data_file(&path, "zip") {
                    jobs.push(Job::PackZip(path));
                }
            }
        }
    }

    Ok(())
}

fn gather_archives(dir: &Path, jobs: &mut Vec<Job>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        // zero-length region files turn up in the wild; nothing to read there
        if is_data_file(&path, "mca") && std::fs::metadata(&path)?.len() > 0 {
            jobs.push(Job::Mca(path));
        }
    }

    Ok(())
}

fn is_data_file(path: &Path, ext: &str) -> bool {
    path.is_file() && path.extension().map_or(false, |e| e == ext)
}

fn is_pack_text(path: &Path) -> bool {
    path.extension()
        .map_or(false, |e| e == "json" || e == "mcfunction")
}

fn process_mca(path: &Path, consider: &mut dyn FnMut(&str)) -> Result<()> {
    let file = File::open(path)?;
    // Most of a region's 1024 slots are typically absent; mapping the file
    // lets the reader seek straight to the sectors that matter. The mapping
    // lives only as long as this unit of work.
    let map = unsafe { Mmap::map(&file)? };

    let mut region = Region::new(Cursor::new(&map[..]));
    region.for_each_chunk(|x, z, data| match nbt::from_reader(data) {
        Ok(root) => scan_tag(&root, consider),
        Err(e) => warn!("skipping chunk ({}, {}) of {}: {}", x, z, path.display(), e),
    })
}

fn process_dat(path: &Path, consider: &mut dyn FnMut(&str)) -> Result<()> {
    // player data and level.dat are gzip-compressed NBT
    let file = File::open(path)?;
    let root = nbt::from_reader(GzDecoder::new(file))?;
    scan_tag(&root, consider);
    Ok(())
}

fn process_pack_dir(pack: &Path, consider: &mut dyn FnMut(&str)) -> Result<()> {
    for entry in WalkDir::new(pack) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_pack_text(path) {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(text) => scan_text(&text, consider),
            Err(e) => warn!("unable to read {}: {}", path.display(), e),
        }
    }

    Ok(())
}

fn process_pack_zip(path: &Path, consider: &mut dyn FnMut(&str)) -> Result<()> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| Error::Io(e.into()))?;

    // treat the archive as a read-only directory of its file entries
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| Error::Io(e.into()))?;
        if !entry.is_file() || !is_pack_text(Path::new(entry.name())) {
            continue;
        }

        let mut text = String::new();
        match entry.read_to_string(&mut text) {
            Ok(_) => scan_text(&text, consider),
            Err(e) => warn!(
                "unable to read {} in {}: {}",
                entry.name(),
                path.display(),
                e
            ),
        }
    }

    Ok(())
}
