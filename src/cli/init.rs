//! Init command implementation
//!
//! Scaffolds a DocQA working directory: `docqa.toml`, `.env.example`,
//! `.gitignore` and the `data/` and `db/` folders.

use super::output::Output;
use crate::utils::toml_config::CONFIG_TEMPLATE;
use std::fs;
use std::path::Path;

/// Result of the init operation
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (docqa.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: std::path::PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
    /// Ollama model used for both answers and embeddings
    pub model: String,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing DocQA Project");

    let base_path = &config.path;

    let config_path = base_path.join("docqa.toml");
    if config_path.exists() && !config.force {
        output.warning("docqa.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.header("Creating directories");

    for dir in ["data", "db"] {
        let dir_path = base_path.join(dir);
        if !dir_path.exists() {
            if let Err(e) = fs::create_dir_all(&dir_path) {
                output.error(&format!("Failed to create {}: {}", dir, e));
                return InitResult::Error(e.to_string());
            }
            output.created("directory", dir);
        } else {
            output.skipped(dir, "already exists");
        }
    }

    output.header("Creating configuration files");

    let toml_content = generate_docqa_toml(&config);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create docqa.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "docqa.toml");

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        if let Err(e) = write_file(&gitignore_path, &generate_gitignore(), false) {
            output.warning(&format!("Failed to create .gitignore: {}", e));
        } else {
            output.created("file", ".gitignore");
        }
    }

    output.success("DocQA project initialized");

    output.header("Next Steps");
    output.info("1. Start Ollama and pull the model:");
    output.command("ollama serve");
    output.command(&format!("ollama pull {}", config.model));
    output.info("2. Start Chroma:");
    output.command("docker run -p 8000:8000 chromadb/chroma");
    output.info("3. Start the server:");
    output.command("docqa");

    output.hint(&format!(
        "The UI will be available at http://{}:{}",
        config.host, config.port
    ));

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(()); // Skip existing files unless force is true
    }
    fs::write(path, content)
}

fn generate_docqa_toml(config: &InitConfig) -> String {
    CONFIG_TEMPLATE
        .replace(
            "host = \"127.0.0.1\"",
            &format!("host = \"{}\"", config.host),
        )
        .replace("port = 8501", &format!("port = {}", config.port))
        .replace(
            "\nmodel = \"gemma:2b\"",
            &format!("\nmodel = \"{}\"", config.model),
        )
        .replace(
            "embedding_model = \"gemma:2b\"",
            &format!("embedding_model = \"{}\"", config.model),
        )
}

fn generate_env_example() -> String {
    r#"# DocQA environment overrides (copy to .env)

# DOCQA_HOST=127.0.0.1
# DOCQA_PORT=8501
# DOCQA_DATA_DIR=data
# DOCQA_DB_DIR=db
# DOCQA_OLLAMA_URL=http://localhost:11434
# DOCQA_MODEL=gemma:2b
# DOCQA_EMBEDDING_MODEL=gemma:2b
# DOCQA_CHROMA_URL=http://localhost:8000

# Log filter, takes precedence over server.log_level
# RUST_LOG=docqa=debug,tower_http=info
"#
    .to_string()
}

fn generate_gitignore() -> String {
    r#"# Uploaded documents and index
data/
db/

# Environment
.env

# Build
target/
"#
    .to_string()
}
