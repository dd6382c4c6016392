use std::{env, fmt};

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub mongo_collection: String,
    /// Collection holding converted reports.
    pub mongo_reports_collection: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_region: Option<String>,
    pub s3_bucket: Option<String>,
    /// Canned ACL sent with every upload; `None` leaves visibility to the bucket policy.
    pub s3_object_acl: Option<String>,
    pub max_file_size: usize,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            mongo_uri: None,
            mongo_database: "mydatabase".to_string(),
            mongo_collection: "mycollection".to_string(),
            mongo_reports_collection: "reports".to_string(),
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_region: None,
            s3_bucket: None,
            s3_object_acl: None,
            max_file_size: 50 * 1024 * 1024, // 50MB
            request_timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = var("HOST") {
            config.host = host;
        }

        if let Some(port) = var("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                config.port = port_num;
            }
        }

        config.mongo_uri = var("MONGO_URI");

        if let Some(database) = var("MONGO_DATABASE") {
            config.mongo_database = database;
        }

        if let Some(collection) = var("MONGO_COLLECTION") {
            config.mongo_collection = collection;
        }

        if let Some(collection) = var("MONGO_REPORTS_COLLECTION") {
            config.mongo_reports_collection = collection;
        }

        config.aws_access_key_id = var("AWS_ACCESS_KEY_ID");
        config.aws_secret_access_key = var("AWS_SECRET_ACCESS_KEY");
        config.aws_region = var("AWS_REGION");
        config.s3_bucket = var("AWS_S3_BUCKET_NAME");
        config.s3_object_acl = var("AWS_S3_OBJECT_ACL");

        if let Some(max_size) = var("MAX_FILE_SIZE") {
            if let Ok(size) = max_size.parse::<usize>() {
                config.max_file_size = size;
            }
        }

        if let Some(timeout) = var("REQUEST_TIMEOUT_SECONDS") {
            if let Ok(timeout_num) = timeout.parse::<u64>() {
                config.request_timeout_seconds = timeout_num;
            }
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Hand-written so the secret key and connection string never reach the logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");

        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("mongo_uri", &redact(&self.mongo_uri))
            .field("mongo_database", &self.mongo_database)
            .field("mongo_collection", &self.mongo_collection)
            .field("mongo_reports_collection", &self.mongo_reports_collection)
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &redact(&self.aws_secret_access_key))
            .field("aws_region", &self.aws_region)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_object_acl", &self.s3_object_acl)
            .field("max_file_size", &self.max_file_size)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}
