use std::{fs, path::Path};

use once_cell::sync::Lazy;
use rand::{distr::Alphanumeric, rng, Rng};
use serde::{Deserialize, Serialize};

use crate::schema::enum_def::GenerationKind;

// --- START STORAGE CONFIG ---

/// Storage driver type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageDriver {
    Local,
    S3,
}

impl Default for StorageDriver {
    fn default() -> Self {
        StorageDriver::Local
    }
}

/// Local storage specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    #[serde(default = "default_local_storage_root")]
    pub root: String,
    /// URL prefix under which the local root is served back to clients.
    #[serde(default = "default_local_public_base")]
    pub public_base: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root: default_local_storage_root(),
            public_base: default_local_public_base(),
        }
    }
}

/// S3 storage specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub bucket: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    pub public_url: Option<String>,
}

/// Overall storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub driver: StorageDriver,
    #[serde(default)]
    pub local: LocalStorageConfig,
    pub s3: Option<S3StorageConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            driver: StorageDriver::default(),
            local: LocalStorageConfig::default(),
            s3: None,
        }
    }
}

// --- PARTIAL STORAGE CONFIG for merging ---

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialLocalStorageConfig {
    pub root: Option<String>,
    pub public_base: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialS3StorageConfig {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub force_path_style: Option<bool>,
    pub public_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialStorageConfig {
    pub driver: Option<StorageDriver>,
    pub local: Option<PartialLocalStorageConfig>,
    pub s3: Option<PartialS3StorageConfig>,
}

impl PartialStorageConfig {
    fn merge_into(self, final_config: &mut StorageConfig) {
        if let Some(driver) = self.driver {
            final_config.driver = driver;
        }

        if let Some(local_partial) = self.local {
            if let Some(root) = local_partial.root {
                final_config.local.root = root;
            }
            if let Some(public_base) = local_partial.public_base {
                final_config.local.public_base = public_base;
            }
        }

        if let Some(s3_partial) = self.s3 {
            match &mut final_config.s3 {
                Some(s3_final) => { // s3 config already exists, merge into it
                    if let Some(endpoint) = s3_partial.endpoint { s3_final.endpoint = Some(endpoint); }
                    if let Some(region) = s3_partial.region { s3_final.region = Some(region); }
                    if let Some(bucket) = s3_partial.bucket { s3_final.bucket = bucket; }
                    if let Some(access_key) = s3_partial.access_key { s3_final.access_key = Some(access_key); }
                    if let Some(secret_key) = s3_partial.secret_key { s3_final.secret_key = Some(secret_key); }
                    if let Some(force_path_style) = s3_partial.force_path_style { s3_final.force_path_style = force_path_style; }
                    if let Some(public_url) = s3_partial.public_url { s3_final.public_url = Some(public_url); }
                }
                None => { // no s3 config, try to create from partial
                    if let Some(bucket) = s3_partial.bucket {
                        final_config.s3 = Some(S3StorageConfig {
                            bucket,
                            endpoint: s3_partial.endpoint,
                            region: s3_partial.region,
                            access_key: s3_partial.access_key,
                            secret_key: s3_partial.secret_key,
                            force_path_style: s3_partial.force_path_style.unwrap_or(false),
                            public_url: s3_partial.public_url,
                        });
                    }
                }
            }
        }
    }
}

// --- START PROVIDER CONFIG ---

/// API keys for the generation providers. Every key is optional: an
/// unconfigured provider is skipped by the fallback chain, so partial
/// deployments still serve requests through whichever tiers have keys.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub fal_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub replicate_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialProvidersConfig {
    pub fal_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub replicate_api_key: Option<String>,
}

impl PartialProvidersConfig {
    fn merge_into(self, final_config: &mut ProvidersConfig) {
        if let Some(key) = self.fal_api_key {
            final_config.fal_api_key = Some(key);
        }
        if let Some(key) = self.gemini_api_key {
            final_config.gemini_api_key = Some(key);
        }
        if let Some(key) = self.elevenlabs_api_key {
            final_config.elevenlabs_api_key = Some(key);
        }
        if let Some(key) = self.replicate_api_key {
            final_config.replicate_api_key = Some(key);
        }
    }
}

// --- START COSTS CONFIG ---

/// CTY cost per generation kind. This is the single source of truth for
/// pricing; clients read it from `GET /generate/costs` instead of
/// mirroring their own constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostsConfig {
    #[serde(default = "default_image_cost")]
    pub image: i64,
    #[serde(default = "default_sound_cost")]
    pub sound: i64,
    #[serde(default = "default_living_cost")]
    pub living: i64,
}

impl Default for CostsConfig {
    fn default() -> Self {
        Self {
            image: default_image_cost(),
            sound: default_sound_cost(),
            living: default_living_cost(),
        }
    }
}

impl CostsConfig {
    pub fn cost(&self, kind: GenerationKind) -> i64 {
        match kind {
            GenerationKind::Image => self.image,
            GenerationKind::Sound => self.sound,
            GenerationKind::Living => self.living,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialCostsConfig {
    pub image: Option<i64>,
    pub sound: Option<i64>,
    pub living: Option<i64>,
}

impl PartialCostsConfig {
    fn merge_into(self, final_config: &mut CostsConfig) {
        if let Some(image) = self.image {
            final_config.image = image;
        }
        if let Some(sound) = self.sound {
            final_config.sound = sound;
        }
        if let Some(living) = self.living {
            final_config.living = living;
        }
    }
}

fn default_image_cost() -> i64 {
    5
}

fn default_sound_cost() -> i64 {
    8
}

fn default_living_cost() -> i64 {
    12
}

fn default_local_storage_root() -> String {
    "storage/media".to_string()
}

fn default_local_public_base() -> String {
    "/files".to_string()
}

// Used for deserializing user-provided config files where all fields are optional.
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub base_path: Option<String>,
    pub jwt_secret: Option<String>,
    pub db_url: Option<String>,
    pub proxy: Option<String>,
    pub log_level: Option<String>,
    pub storage: Option<PartialStorageConfig>,
    pub providers: Option<PartialProvidersConfig>,
    pub costs: Option<PartialCostsConfig>,
}

impl PartialConfig {
    /// Merges the fields of this partial config into a final config, overwriting existing values.
    fn merge_into(self, final_config: &mut FinalConfig) {
        if let Some(host) = self.host { final_config.host = host; }
        if let Some(port) = self.port { final_config.port = port; }
        if let Some(base_path) = self.base_path { final_config.base_path = base_path; }
        if let Some(jwt_secret) = self.jwt_secret { final_config.jwt_secret = jwt_secret; }
        if let Some(db_url) = self.db_url { final_config.db_url = db_url; }
        if let Some(proxy) = self.proxy { final_config.proxy = Some(proxy); }
        if let Some(log_level) = self.log_level { final_config.log_level = log_level; }
        if let Some(storage) = self.storage {
            storage.merge_into(&mut final_config.storage)
        }
        if let Some(providers) = self.providers {
            providers.merge_into(&mut final_config.providers)
        }
        if let Some(costs) = self.costs {
            costs.merge_into(&mut final_config.costs)
        }
    }
}

// The fully resolved configuration used by the application.
// This is also the format for the default configuration file.
#[derive(Debug, Deserialize, Serialize)]
pub struct FinalConfig {
    pub host: String,
    pub port: u16,
    pub base_path: String,
    pub jwt_secret: String,
    pub db_url: String,
    pub proxy: Option<String>,
    pub log_level: String,
    pub storage: StorageConfig,
    pub providers: ProvidersConfig,
    pub costs: CostsConfig,
}

fn generate_random_string(len: usize) -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn get_env_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn get_config_from_env() -> PartialConfig {
    PartialConfig {
        host: get_env_var("HOST"),
        port: get_env_var("PORT"),
        base_path: get_env_var("BASE_PATH"),
        jwt_secret: get_env_var("JWT_SECRET"),
        db_url: get_env_var("DB_URL"),
        proxy: get_env_var("PROXY"),
        log_level: get_env_var("LOG_LEVEL"),
        storage: None,
        // Provider keys keep the env var names the hosted deployment used.
        providers: Some(PartialProvidersConfig {
            fal_api_key: get_env_var("FAL_API_KEY"),
            gemini_api_key: get_env_var("GEMINI_API_KEY"),
            elevenlabs_api_key: get_env_var("ELEVENLABS_API_KEY"),
            replicate_api_key: get_env_var("REPLICATE_API_KEY"),
        }),
        costs: None,
    }
}

pub static CONFIG: Lazy<FinalConfig> = Lazy::new(|| {
    let default_config_path = Path::new("config.default.yaml");
    let user_config_path_primary = Path::new("config.local.yaml");
    let user_config_path_fallback = Path::new("config.yaml");

    // Determine which user config file to use for overrides
    let user_config_path = if user_config_path_primary.exists() {
        user_config_path_primary
    } else {
        user_config_path_fallback
    };

    // Create a FinalConfig with programmatic defaults.
    let mut effective_default_config = FinalConfig {
        host: "0.0.0.0".to_string(),
        port: 8000,
        base_path: "/api".to_string(),
        jwt_secret: generate_random_string(48),
        db_url: "./storage/sanctra.db".to_string(),
        proxy: None,
        log_level: "info".to_string(),
        storage: StorageConfig::default(),
        providers: ProvidersConfig::default(),
        costs: CostsConfig::default(),
    };

    // If a default config file exists, load it as partial and merge it over the programmatic defaults.
    if default_config_path.exists() {
        if let Ok(config_str) = fs::read_to_string(default_config_path) {
            let file_defaults: PartialConfig = serde_yaml::from_str(&config_str)
                .unwrap_or_else(|e| panic!("Failed to parse default configuration file at {:?}: {}", default_config_path, e));

            file_defaults.merge_into(&mut effective_default_config);
        }
    }

    // Write the (potentially updated) defaults back to the file.
    // This ensures new fields are added to config.default.yaml.
    let yaml_str = serde_yaml::to_string(&effective_default_config).unwrap();
    fs::write(default_config_path, yaml_str)
        .unwrap_or_else(|err| panic!("Failed to write default configuration file: {}", err));

    // Start with the effective defaults.
    let mut final_config = effective_default_config;

    // Load the user's config if it exists. It's optional and overrides the defaults.
    if user_config_path.exists() {
        if let Ok(config_str) = fs::read_to_string(user_config_path) {
            let user_config: PartialConfig = serde_yaml::from_str(&config_str)
                .unwrap_or_else(|e| panic!("Failed to parse user configuration file at {:?}: {}", user_config_path, e));

            // Merge user overrides into the final config
            user_config.merge_into(&mut final_config);
        }
    }

    // Load config from environment variables, which have the highest priority.
    get_config_from_env().merge_into(&mut final_config);

    if final_config.storage.driver == StorageDriver::S3 && final_config.storage.s3.is_none() {
        final_config.storage.driver = StorageDriver::Local;
    }

    final_config
});
