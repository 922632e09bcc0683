//! Crosstag CLI - persistent cross-reference index for C/C++
//!
//! Usage: crosstag <command> [arguments]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use crosstag::{load_compile_commands, IndexOptions, Storage, DB_FILE_NAME};

fn print_usage() {
    eprintln!("Crosstag - persistent cross-reference index for C/C++");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  crosstag load [--db <FILE>] [--file <JSON>]");
    eprintln!("  crosstag index [--db <FILE>] [--exclude <PREFIX>]... [--diagnostics] [SOURCE]...");
    eprintln!("  crosstag update [--db <FILE>] [--diagnostics] [SOURCE]...");
    eprintln!("  crosstag def --file <PATH> --offset <N> [--db <FILE>]");
    eprintln!("  crosstag grep --usr <USR> [--db <FILE>]");
    eprintln!("  crosstag files [--db <FILE>]");
    eprintln!("  crosstag status [--db <FILE>]");
    eprintln!("  crosstag version");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  load     Load compile commands from a compilation database");
    eprintln!("  index    Rebuild the index from scratch");
    eprintln!("  update   Reparse whatever changed on disk");
    eprintln!("  def      Find definitions for the entity at a byte offset");
    eprintln!("  grep     List every occurrence of a symbol by USR");
    eprintln!("  files    List all indexed files");
    eprintln!("  status   Show database statistics");
    eprintln!("  version  Show version and build information");
    eprintln!();
    eprintln!("Common arguments:");
    eprintln!("  --db <FILE>         Tag database (default: {})", DB_FILE_NAME);
    eprintln!();
    eprintln!("Load arguments:");
    eprintln!("  --file <JSON>       Compilation database (default: compile_commands.json)");
    eprintln!();
    eprintln!("Index arguments:");
    eprintln!("  --exclude <PREFIX>  Skip files whose path starts with PREFIX (repeatable)");
    eprintln!("  --diagnostics       Print parser diagnostics for each translation unit");
    eprintln!("  [SOURCE]...         Only reparse these translation units");
    eprintln!();
    eprintln!("Def arguments:");
    eprintln!("  --file <PATH>       File the offset refers into");
    eprintln!("  --offset <N>        Byte offset from the start of the file");
    eprintln!();
    eprintln!("Grep arguments:");
    eprintln!("  --usr <USR>         Unified Symbol Resolution string to look up");
}

enum Command {
    Load {
        db_path: PathBuf,
        json_path: PathBuf,
    },
    Index {
        db_path: PathBuf,
        exclude: Vec<String>,
        diagnostics: bool,
        file_names: Vec<String>,
    },
    Update {
        db_path: PathBuf,
        diagnostics: bool,
        file_names: Vec<String>,
    },
    Def {
        db_path: PathBuf,
        file: String,
        offset: u32,
    },
    Grep {
        db_path: PathBuf,
        usr: String,
    },
    Files {
        db_path: PathBuf,
    },
    Status {
        db_path: PathBuf,
    },
    Version,
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    if i + 1 >= args.len() {
        return Err(anyhow::anyhow!("{} requires an argument", flag));
    }
    Ok(&args[i + 1])
}

fn parse_args(args: &[String]) -> Result<Command> {
    let command = args[1].as_str();
    match command {
        "load" => {
            let mut db_path = PathBuf::from(DB_FILE_NAME);
            let mut json_path = PathBuf::from("compile_commands.json");

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--db" => {
                        db_path = PathBuf::from(flag_value(args, i, "--db")?);
                        i += 2;
                    }
                    "--file" => {
                        json_path = PathBuf::from(flag_value(args, i, "--file")?);
                        i += 2;
                    }
                    _ => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                    }
                }
            }

            Ok(Command::Load { db_path, json_path })
        }
        "index" => {
            let mut db_path = PathBuf::from(DB_FILE_NAME);
            let mut exclude = Vec::new();
            let mut diagnostics = false;
            let mut file_names = Vec::new();

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--db" => {
                        db_path = PathBuf::from(flag_value(args, i, "--db")?);
                        i += 2;
                    }
                    "--exclude" => {
                        exclude.push(flag_value(args, i, "--exclude")?.to_string());
                        i += 2;
                    }
                    "--diagnostics" => {
                        diagnostics = true;
                        i += 1;
                    }
                    other if !other.starts_with('-') => {
                        file_names.push(other.to_string());
                        i += 1;
                    }
                    _ => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                    }
                }
            }

            Ok(Command::Index {
                db_path,
                exclude,
                diagnostics,
                file_names,
            })
        }
        "update" => {
            let mut db_path = PathBuf::from(DB_FILE_NAME);
            let mut diagnostics = false;
            let mut file_names = Vec::new();

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--db" => {
                        db_path = PathBuf::from(flag_value(args, i, "--db")?);
                        i += 2;
                    }
                    "--diagnostics" => {
                        diagnostics = true;
                        i += 1;
                    }
                    other if !other.starts_with('-') => {
                        file_names.push(other.to_string());
                        i += 1;
                    }
                    _ => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                    }
                }
            }

            Ok(Command::Update {
                db_path,
                diagnostics,
                file_names,
            })
        }
        "def" => {
            let mut db_path = PathBuf::from(DB_FILE_NAME);
            let mut file: Option<String> = None;
            let mut offset: Option<u32> = None;

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--db" => {
                        db_path = PathBuf::from(flag_value(args, i, "--db")?);
                        i += 2;
                    }
                    "--file" => {
                        file = Some(flag_value(args, i, "--file")?.to_string());
                        i += 2;
                    }
                    "--offset" => {
                        let raw = flag_value(args, i, "--offset")?;
                        offset = Some(
                            raw.parse()
                                .map_err(|_| anyhow::anyhow!("--offset must be an integer"))?,
                        );
                        i += 2;
                    }
                    _ => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                    }
                }
            }

            let file = file.ok_or_else(|| anyhow::anyhow!("--file is required"))?;
            let offset = offset.ok_or_else(|| anyhow::anyhow!("--offset is required"))?;

            Ok(Command::Def {
                db_path,
                file,
                offset,
            })
        }
        "grep" => {
            let mut db_path = PathBuf::from(DB_FILE_NAME);
            let mut usr: Option<String> = None;

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--db" => {
                        db_path = PathBuf::from(flag_value(args, i, "--db")?);
                        i += 2;
                    }
                    "--usr" => {
                        usr = Some(flag_value(args, i, "--usr")?.to_string());
                        i += 2;
                    }
                    _ => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                    }
                }
            }

            let usr = usr.ok_or_else(|| anyhow::anyhow!("--usr is required"))?;

            Ok(Command::Grep { db_path, usr })
        }
        "files" | "status" => {
            let mut db_path = PathBuf::from(DB_FILE_NAME);

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--db" => {
                        db_path = PathBuf::from(flag_value(args, i, "--db")?);
                        i += 2;
                    }
                    _ => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                    }
                }
            }

            if command == "files" {
                Ok(Command::Files { db_path })
            } else {
                Ok(Command::Status { db_path })
            }
        }
        "version" => Ok(Command::Version),
        _ => Err(anyhow::anyhow!("Unknown command: {}", command)),
    }
}

fn run_load(db_path: PathBuf, json_path: PathBuf) -> Result<()> {
    let storage = Storage::open(&db_path)?;
    let loaded = load_compile_commands(&storage, &json_path)?;
    println!("{} compile commands loaded", loaded);
    Ok(())
}

#[cfg(feature = "libclang")]
fn run_index(db_path: PathBuf, options: IndexOptions, full: bool) -> Result<()> {
    use crosstag::parse::libclang::ClangParser;

    let storage = Storage::open(&db_path)?;
    let clang = clang::Clang::new().map_err(|e| anyhow::anyhow!("could not load libclang: {}", e))?;
    let parser = ClangParser::new(&clang);

    let mut stdout = std::io::stdout();
    if full {
        crosstag::index(&storage, &parser, &options, &mut stdout)?;
    } else {
        crosstag::update(&storage, &parser, &options, &mut stdout)?;
    }
    Ok(())
}

#[cfg(not(feature = "libclang"))]
fn run_index(db_path: PathBuf, options: IndexOptions, full: bool) -> Result<()> {
    let _ = (db_path, options, full);
    anyhow::bail!("this build has no parser; rebuild with `--features libclang`")
}

fn run_def(db_path: PathBuf, file: String, offset: u32) -> Result<()> {
    let storage = Storage::open(&db_path)?;
    let results = storage.find_definition(&file, offset)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn run_grep(db_path: PathBuf, usr: String) -> Result<()> {
    let storage = Storage::open(&db_path)?;
    let references = storage.grep(&usr)?;
    println!("{}", serde_json::to_string_pretty(&references)?);
    Ok(())
}

fn run_files(db_path: PathBuf) -> Result<()> {
    let storage = Storage::open(&db_path)?;
    let names = storage.file_names()?;

    if names.is_empty() {
        println!("0 indexed files");
    } else {
        println!("{} indexed files:", names.len());
        for name in names {
            let tags = storage.count_tags_in(&name)?;
            println!("  {} ({} tags)", name, tags);
        }
    }
    Ok(())
}

fn run_status(db_path: PathBuf) -> Result<()> {
    let storage = Storage::open(&db_path)?;

    println!("files: {}", storage.count_files()?);
    println!("includes: {}", storage.count_includes()?);
    println!("tags: {}", storage.count_tags()?);
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match parse_args(&args) {
        Ok(Command::Load { db_path, json_path }) => {
            if let Err(e) = run_load(db_path, json_path) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Ok(Command::Index {
            db_path,
            exclude,
            diagnostics,
            file_names,
        }) => {
            let options = IndexOptions {
                file_names,
                exclude,
                diagnostics,
            };
            if let Err(e) = run_index(db_path, options, true) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Ok(Command::Update {
            db_path,
            diagnostics,
            file_names,
        }) => {
            let options = IndexOptions {
                file_names,
                exclude: Vec::new(),
                diagnostics,
            };
            if let Err(e) = run_index(db_path, options, false) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Ok(Command::Def {
            db_path,
            file,
            offset,
        }) => {
            if let Err(e) = run_def(db_path, file, offset) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Ok(Command::Grep { db_path, usr }) => {
            if let Err(e) = run_grep(db_path, usr) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Ok(Command::Files { db_path }) => {
            if let Err(e) = run_files(db_path) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Ok(Command::Status { db_path }) => {
            if let Err(e) = run_status(db_path) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Ok(Command::Version) => {
            println!("{}", crosstag::version::version());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            ExitCode::from(1)
        }
    }
}
