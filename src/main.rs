//! cinegraph CLI: build and query the film knowledge graph.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use cinegraph::config::CinegraphConfig;
use cinegraph::engine::{Population, PopulationEngine, RowOutcome};
use cinegraph::export::{GraphFormat, RdfExporter, to_json};
use cinegraph::query::{FilmStore, FilmSummary};
use cinegraph::schema::Schema;
use cinegraph::table::load_table;

#[derive(Parser)]
#[command(name = "cinegraph", version, about = "Film table to knowledge graph")]
struct Cli {
    /// Configuration file (TOML). Defaults apply when absent.
    #[arg(long, global = true, default_value = "cinegraph.toml")]
    config: PathBuf,

    /// Finalized film table (CSV).
    #[arg(long, global = true, default_value = "films_clean.csv")]
    input: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Populate the graph and write it in the configured formats.
    Build {
        /// Output directory (overrides the config).
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Output formats (overrides the config; repeatable).
        #[arg(long = "format", value_enum)]
        formats: Vec<GraphFormat>,

        /// Check the populated graph against the schema before writing.
        #[arg(long)]
        validate: bool,
    },

    /// Populate the graph and print the population report.
    Stats,

    /// List films, optionally restricted to one genre.
    Films {
        /// Genre name, matched case-insensitively.
        #[arg(long)]
        genre: Option<String>,
    },

    /// Search films by title substring.
    Search {
        term: String,
    },

    /// List genres.
    Genres,

    /// Show a film and recommend related films.
    Recommend {
        /// Exact film title.
        title: String,
    },

    /// Export all triples as JSON.
    Triples {
        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn populate(input: &Path, config: &CinegraphConfig) -> Result<Population> {
    let rows = load_table(input)?;
    let engine = PopulationEngine::new(Schema::film(), config.population());
    let population = engine.populate(&rows);

    for (row, outcome) in population.outcomes.iter().enumerate() {
        if let RowOutcome::Skipped { reason } = outcome {
            tracing::debug!(row, %reason, "row skipped");
        }
    }
    tracing::info!(
        input = %input.display(),
        rows = population.report.rows,
        skipped = population.report.skipped_rows,
        triples = population.report.triples,
        "graph populated"
    );
    Ok(population)
}

fn open_store(population: &Population, config: &CinegraphConfig) -> Result<FilmStore> {
    let exporter = RdfExporter::new(Schema::film(), config.output.namespace.clone());
    Ok(FilmStore::from_graph(&population.graph, &exporter)?)
}

fn print_film(film: &FilmSummary) {
    let year = film.year.map(|y| format!(" ({y})")).unwrap_or_default();
    let duration = film.duration.map(|d| format!(", {d} min")).unwrap_or_default();
    println!("  {}{year}{duration}", film.title);
    if !film.directors.is_empty() {
        println!("    director: {}", film.directors.join(", "));
    }
    if !film.genres.is_empty() {
        println!("    genres:   {}", film.genres.join(", "));
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = CinegraphConfig::load_or_default(Some(cli.config.as_path()))?;

    match cli.command {
        Commands::Build {
            out_dir,
            formats,
            validate,
        } => {
            let population = populate(&cli.input, &config)?;
            if validate {
                Schema::film().check_graph(&population.graph)?;
                println!("Schema check passed.");
            }

            let out_dir = out_dir.unwrap_or_else(|| config.output.directory.clone());
            std::fs::create_dir_all(&out_dir).into_diagnostic()?;
            let formats = if formats.is_empty() {
                config.output.formats.clone()
            } else {
                formats
            };

            let exporter = RdfExporter::new(Schema::film(), config.output.namespace.clone())
                .with_ontology(config.output.include_ontology);
            for format in formats {
                let path = out_dir.join(format!("{}.{}", config.output.basename, format.extension()));
                exporter.write_file(&population.graph, format, &path)?;
                tracing::info!(%format, path = %path.display(), "graph written");
                println!("Wrote {format} to {}", path.display());
            }
            println!("{}", population.report);
        }

        Commands::Stats => {
            let population = populate(&cli.input, &config)?;
            println!("{}", population.report);
            let merged = population
                .outcomes
                .iter()
                .filter(|o| matches!(o, RowOutcome::Ingested { merged: true, .. }))
                .count();
            if merged > 0 {
                println!("Rows merged into an existing film: {merged}");
            }
        }

        Commands::Films { genre } => {
            let population = populate(&cli.input, &config)?;
            let store = open_store(&population, &config)?;
            let films = match genre {
                Some(name) => {
                    let genres = store.genres()?;
                    let Some(found) = genres.iter().find(|g| g.name.eq_ignore_ascii_case(&name)) else {
                        miette::bail!("no genre named \"{name}\"; run `cinegraph genres` to list them");
                    };
                    store.films_by_genre(&found.iri)?
                }
                None => store.films()?,
            };
            println!("Films ({}):", films.len());
            for film in &films {
                print_film(film);
            }
        }

        Commands::Search { term } => {
            let population = populate(&cli.input, &config)?;
            let store = open_store(&population, &config)?;
            let films = store.search(&term)?;
            if films.is_empty() {
                println!("No film matches \"{term}\".");
            } else {
                println!("Matches for \"{term}\" ({}):", films.len());
                for film in &films {
                    print_film(film);
                }
            }
        }

        Commands::Genres => {
            let population = populate(&cli.input, &config)?;
            let store = open_store(&population, &config)?;
            let genres = store.genres()?;
            println!("Genres ({}):", genres.len());
            for genre in &genres {
                println!("  {}", genre.name);
            }
        }

        Commands::Recommend { title } => {
            let population = populate(&cli.input, &config)?;
            let store = open_store(&population, &config)?;
            let iri = store.find_film(&title)?;
            if let Some(details) = store.film_details(&iri)? {
                print_film(&details.film);
                if !details.actors.is_empty() {
                    println!("    actors:   {}", details.actors.join(", "));
                }
            }

            let recommendations = store.recommend(&iri)?;
            if recommendations.is_empty() {
                println!("No recommendations.");
            } else {
                println!("Recommendations ({}):", recommendations.len());
                for rec in &recommendations {
                    let year = rec.year.map(|y| format!(" ({y})")).unwrap_or_default();
                    println!("  {}{year}  [{}]", rec.title, rec.reason);
                }
            }
        }

        Commands::Triples { output } => {
            let population = populate(&cli.input, &config)?;
            let json = to_json(&population.graph)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).into_diagnostic()?;
                    println!(
                        "Exported {} triples to {}",
                        population.graph.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}
