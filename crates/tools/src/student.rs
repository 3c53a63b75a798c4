//! Student record lookup against the remote school service
//!
//! Endpoints (relative to the configured base URL):
//! - `GET /lista/alumno` – every record
//! - `GET /obtener/alumno/{id}` – one record, 404 when absent
//! - `GET /home` – liveness

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use bank_assistant_config::StudentServiceConfig;
use bank_assistant_core::Tool;

pub const NAME: &str = "consultar_estudiante";
pub const DESCRIPTION: &str = "Consulta información de estudiantes del sistema MyrluxBack.
Parámetros: id_estudiante (número) o 'todos' para listar todos";

pub const INVALID_ID: &str = "Por favor proporciona un ID válido o escribe 'todos'";
pub const EMPTY_LIST: &str = "No hay estudiantes registrados en el sistema.";
pub const UNREACHABLE: &str =
    "❌ No se pudo conectar con MyrluxBack. ¿Está ejecutándose en puerto 11002?";
pub const TIMED_OUT: &str = "⏱️ Timeout consultando MyrluxBack";

/// Student service failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Service unreachable: {0}")]
    Unreachable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Record not found")]
    NotFound,

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_decode() {
            ServiceError::InvalidResponse(err.to_string())
        } else {
            ServiceError::Unreachable(err.to_string())
        }
    }
}

/// One student as returned by the service; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StudentRecord {
    #[serde(default, deserialize_with = "text_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub nombres: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub apellidos: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub telefono: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub direccion: Option<String>,
}

// The service emits numeric ids and phone numbers as JSON numbers
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl StudentRecord {
    fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.nombres.as_deref().unwrap_or(""),
            self.apellidos.as_deref().unwrap_or("")
        )
    }

    fn field(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("N/A")
    }
}

/// HTTP client for the student service
#[derive(Debug, Clone)]
pub struct StudentServiceClient {
    client: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
}

impl StudentServiceClient {
    pub fn new(config: &StudentServiceConfig) -> Result<Self, ServiceError> {
        Self::with_timeouts(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.health_timeout_secs),
        )
    }

    pub fn with_timeouts(
        base_url: &str,
        timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_students(&self) -> Result<Vec<StudentRecord>, ServiceError> {
        let url = format!("{}/lista/alumno", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    pub async fn get_student(&self, id: i64) -> Result<StudentRecord, ServiceError> {
        let url = format!("{}/obtener/alumno/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound);
        }
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Liveness probe with its own shorter timeout
    pub async fn health(&self) -> Result<(), ServiceError> {
        let url = format!("{}/home", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status(status.as_u16()))
        }
    }
}

/// Tool wrapper: `"todos"` lists, an integer fetches one record
#[derive(Debug, Clone)]
pub struct StudentLookupTool {
    client: StudentServiceClient,
    max_listed: usize,
}

impl StudentLookupTool {
    pub fn new(client: StudentServiceClient, max_listed: usize) -> Self {
        Self { client, max_listed }
    }

    pub fn client(&self) -> &StudentServiceClient {
        &self.client
    }

    pub async fn lookup(&self, query: &str) -> String {
        let query = query.trim();
        if query.eq_ignore_ascii_case("todos") {
            return self.render_list().await;
        }
        match query.parse::<i64>() {
            Ok(id) => self.render_one(id).await,
            Err(_) => INVALID_ID.to_string(),
        }
    }

    async fn render_list(&self) -> String {
        let students = match self.client.list_students().await {
            Ok(students) => students,
            Err(ServiceError::Status(code)) => {
                return format!("Error obteniendo estudiantes: {}", code)
            },
            Err(e) => return self.transport_message("list", e),
        };
        if students.is_empty() {
            return EMPTY_LIST.to_string();
        }

        let mut text = String::from("📚 Lista de Estudiantes:\n\n");
        for student in students.iter().take(self.max_listed) {
            text.push_str(&format!("ID: {}\n", StudentRecord::field(&student.id)));
            text.push_str(&format!("Nombre: {}\n", student.full_name()));
            text.push_str(&format!("Email: {}\n", StudentRecord::field(&student.email)));
            text.push_str(&format!(
                "Teléfono: {}\n",
                StudentRecord::field(&student.telefono)
            ));
            text.push_str("---\n");
        }
        if students.len() > self.max_listed {
            text.push_str(&format!(
                "\n... y {} estudiantes más.",
                students.len() - self.max_listed
            ));
        }
        text
    }

    async fn render_one(&self, id: i64) -> String {
        let student = match self.client.get_student(id).await {
            Ok(student) => student,
            Err(ServiceError::NotFound) => {
                return format!("No se encontró estudiante con ID {}", id)
            },
            Err(ServiceError::Status(code)) => {
                return format!("Error consultando estudiante: {}", code)
            },
            Err(e) => return self.transport_message("get", e),
        };

        format!(
            "👨‍🎓 Información del Estudiante:\n\n\
             ID: {}\n\
             Nombre: {}\n\
             Email: {}\n\
             Teléfono: {}\n\
             Dirección: {}\n",
            StudentRecord::field(&student.id),
            student.full_name(),
            StudentRecord::field(&student.email),
            StudentRecord::field(&student.telefono),
            StudentRecord::field(&student.direccion),
        )
    }

    fn transport_message(&self, operation: &str, error: ServiceError) -> String {
        tracing::warn!(
            operation,
            base_url = %self.client.base_url,
            error = %error,
            "Student service request failed"
        );
        match error {
            ServiceError::Timeout => TIMED_OUT.to_string(),
            ServiceError::InvalidResponse(message) => {
                format!("Error inesperado: {}", message)
            },
            _ => UNREACHABLE.to_string(),
        }
    }
}

#[async_trait]
impl Tool for StudentLookupTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn invoke(&self, input: &str) -> String {
        self.lookup(input).await
    }
}
