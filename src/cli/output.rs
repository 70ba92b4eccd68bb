use crate::dict::DictionaryInfo;
use crate::suggest::SuggestionResult;
use crate::CheckResult;
use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonError<'a> {
    file: &'a str,
    line: usize,
    column: usize,
    word: &'a str,
    forbidden: bool,
    suggestions: &'a [String],
    context: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    total_errors: usize,
    errors: Vec<JsonError<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonSuggestions<'a> {
    word: &'a str,
    suggestions: &'a [SuggestionResult],
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `source` is a file path or `-` for standard input.
pub fn print_errors(
    source: &str,
    result: &CheckResult,
    colored_output: bool,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_text_errors(source, result, colored_output);
            Ok(())
        }
        OutputFormat::Json => print_json_errors(source, result),
    }
}

fn print_text_errors(source: &str, result: &CheckResult, colored_output: bool) {
    if result.errors.is_empty() {
        return;
    }

    if colored_output {
        println!("\n{}", source.bold().underline());
    } else {
        println!("\n{}", source);
    }

    for error in &result.errors {
        let line_info = format!("{}:{}", error.line, error.column);
        let marker = if error.forbidden { " (forbidden)" } else { "" };

        if colored_output {
            println!(
                "  {} {}{} {}",
                line_info.blue().bold(),
                error.word.red().bold(),
                marker.yellow(),
                format_context(&error.context, &error.word, colored_output)
            );

            if !error.suggestions.is_empty() {
                let suggestions = error
                    .suggestions
                    .iter()
                    .take(5)
                    .map(|s| s.green().to_string())
                    .collect::<Vec<_>>()
                    .join(&", ".dimmed().to_string());
                println!("    {} {}", "→".dimmed(), suggestions);
            }
        } else {
            println!("  {} {}{} {}", line_info, error.word, marker, &error.context);

            if !error.suggestions.is_empty() {
                let suggestions: Vec<&str> =
                    error.suggestions.iter().take(5).map(String::as_str).collect();
                println!("    → {}", suggestions.join(", "));
            }
        }
    }
}

fn print_json_errors(source: &str, result: &CheckResult) -> Result<()> {
    let errors = result
        .errors
        .iter()
        .map(|e| JsonError {
            file: source,
            line: e.line,
            column: e.column,
            word: &e.word,
            forbidden: e.forbidden,
            suggestions: &e.suggestions,
            context: &e.context,
        })
        .collect();

    print_json(&JsonOutput {
        total_errors: result.error_count,
        errors,
    })
}

fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

pub fn print_check_summary(total_errors: usize, sources: usize, colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
    } else {
        let error_word = if total_errors == 1 { "error" } else { "errors" };
        let file_word = if sources == 1 { "file" } else { "files" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                sources,
                file_word
            );
        } else {
            println!("✗ {} {} found in {} {}", total_errors, error_word, sources, file_word);
        }
    }
}

pub fn print_suggestions(
    word: &str,
    suggestions: &[SuggestionResult],
    show_cost: bool,
    colored: bool,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&JsonSuggestions { word, suggestions });
    }

    if suggestions.is_empty() {
        if colored {
            println!("{} {}", "No suggestions for".yellow(), word.bold());
        } else {
            println!("No suggestions for {}", word);
        }
        return Ok(());
    }

    for s in suggestions {
        match (show_cost, colored) {
            (true, true) => println!("{} {}", s.word.green(), s.cost.to_string().dimmed()),
            (true, false) => println!("{} {}", s.word, s.cost),
            (false, true) => println!("{}", s.word.green()),
            (false, false) => println!("{}", s.word),
        }
    }
    Ok(())
}

pub fn print_dictionary_info(
    info: &DictionaryInfo,
    colored: bool,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(info);
    }

    let title = format!("Dictionary: {}", info.path.display());
    if colored {
        println!("{}", title.bold());
    } else {
        println!("{}", title);
    }
    let compressed = if info.compressed { ", gzip" } else { "" };
    println!("  Format: {}{}", info.format, compressed);
    println!("  Size:   {} bytes", info.size_bytes);
    println!("  Words:  {}", info.word_count);
    println!("  Nodes:  {}", info.node_count);
    println!("  Edges:  {}", info.edge_count);
    Ok(())
}

pub fn print_build_summary(path: &Path, words: usize, nodes: usize, bytes: u64, colored: bool) {
    let path = path.display().to_string();
    if colored {
        println!(
            "{} Wrote {} ({} words, {} nodes, {} bytes)",
            "✓".green().bold(),
            path.cyan(),
            words.to_string().yellow(),
            nodes,
            bytes
        );
    } else {
        println!("✓ Wrote {} ({} words, {} nodes, {} bytes)", path, words, nodes, bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn context_highlighting_is_plain_without_color() {
        assert_eq!(format_context("a wrod here", "wrod", false), "a wrod here");
    }
}
