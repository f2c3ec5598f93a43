//! # Indicator Catalog
//!
//! Read-only lookup from category name to its ordered predefined indicators.
//!
//! The catalog is loaded once at process start and shared by every stage as
//! an `Arc<Catalog>`. It is never mutated afterwards.

use crate::SurveyError;
use crate::primitives::{MAX_CATEGORY_LENGTH, MAX_LABEL_LENGTH, NEW_INDICATOR_PREFIX};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A thematic group of predefined indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub indicators: Vec<String>,
}

/// Ordered collection of categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Build a catalog from custom categories.
    ///
    /// Rejects empty or oversized names, duplicate category names,
    /// duplicate labels within a category, and labels carrying the
    /// proposal prefix (they would collide with respondent proposals).
    pub fn new(categories: Vec<Category>) -> Result<Self, SurveyError> {
        if categories.is_empty() {
            return Err(SurveyError::InvalidCatalog(
                "catalog has no categories".to_string(),
            ));
        }

        let mut names = BTreeSet::new();
        for category in &categories {
            let name = category.name.trim();
            if name.is_empty() || category.name.len() > MAX_CATEGORY_LENGTH {
                return Err(SurveyError::InvalidCatalog(format!(
                    "invalid category name '{}'",
                    category.name
                )));
            }
            if !names.insert(category.name.as_str()) {
                return Err(SurveyError::InvalidCatalog(format!(
                    "duplicate category '{}'",
                    category.name
                )));
            }

            let mut labels = BTreeSet::new();
            for label in &category.indicators {
                if label.trim().is_empty() || label.len() > MAX_LABEL_LENGTH {
                    return Err(SurveyError::InvalidCatalog(format!(
                        "invalid indicator label in '{}'",
                        category.name
                    )));
                }
                if label.starts_with(NEW_INDICATOR_PREFIX) {
                    return Err(SurveyError::InvalidCatalog(format!(
                        "indicator '{}' in '{}' uses the reserved prefix '{}'",
                        label,
                        category.name,
                        NEW_INDICATOR_PREFIX.trim_end()
                    )));
                }
                if !labels.insert(label.as_str()) {
                    return Err(SurveyError::InvalidCatalog(format!(
                        "duplicate indicator '{}' in '{}'",
                        label, category.name
                    )));
                }
            }
        }

        Ok(Self { categories })
    }

    /// The road-project taxonomy the survey ships with.
    #[must_use]
    pub fn builtin() -> Self {
        let categories = BUILTIN
            .iter()
            .map(|(name, indicators)| Category {
                name: (*name).to_string(),
                indicators: indicators.iter().map(|s| (*s).to_string()).collect(),
            })
            .collect();
        Self { categories }
    }

    /// All categories in presentation order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Ordered predefined indicators of a category.
    #[must_use]
    pub fn indicators(&self, category: &str) -> Option<&[String]> {
        self.category(category).map(|c| c.indicators.as_slice())
    }

    /// Check if `label` is a predefined indicator of `category`.
    #[must_use]
    pub fn contains(&self, category: &str, label: &str) -> bool {
        self.indicators(category)
            .is_some_and(|labels| labels.iter().any(|l| l == label))
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of predefined indicators across all categories.
    #[must_use]
    pub fn indicator_count(&self) -> usize {
        self.categories.iter().map(|c| c.indicators.len()).sum()
    }
}

// =============================================================================
// BUILT-IN TAXONOMY
// =============================================================================

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Calidad del Aire",
        &[
            "Monitoreo de gases",
            "Mediciones de calidad del aire",
            "Cantidad de reportes de material particulado",
            "N° riegos realizados / N° riegos programados",
            "N° mallas cortaviento implementadas / N° mallas cortaviento programadas",
            "N° inspecciones realizadas en acopio de materiales / N° inspecciones programadas",
            "N° de lavados de llantas realizados / N° lavados de llantas programados",
        ],
    ),
    (
        "Calidad del Agua",
        &[
            "Mediciones de calidad del agua",
            "N° de tomas de agua ilegales identificadas",
            "N° de conexiones ilegales a cuerpos de agua",
            "Cantidad de sistemas de drenaje en sitio",
            "Cantidad de obras para manejo de aguas en sitio",
            "Reportes de mantenimiento de obras de drenaje",
            "Plan de manejo de aguas residuales",
            "N° de inspecciones de manejo de aguas residuales / N° inspecciones programadas",
        ],
    ),
    (
        "Gestión de Suelos y Erosión",
        &[
            "Construcción de obras de control de erosión (Mínimo una trampa por escombrera)",
            "Reporte de estabilidad de taludes (escombreras)",
            "Muestreos de suelo en plantel (cierre técnico)",
            "Cantidad de obras en sitio (Cuencos temporales)",
            "Cantidad de reportes de sedimentos en áreas de trabajo y cauces receptores",
            "Registros de protección de taludes",
        ],
    ),
    (
        "Biodiversidad y Vegetación",
        &[
            "Registro fotográfico de la reforestación (cierre técnico)",
            "Cantidad de árboles sembrados y especies (cierre técnico)",
            "Zonas recreativas con recuperación de vegetación (cierre técnico)",
            "N° de permisos de tala, poda y reubicación",
            "Registro fotográfico de la reubicación de fauna",
            "Registros de mantenimiento de cobertura vegetal en taludes",
            "Registros de programas de reforestación",
            "Registros de rescate y reubicación de fauna",
            "Registros de permisos de aprovechamiento forestal",
        ],
    ),
    (
        "Gestión de Residuos",
        &[
            "Planos as built y certificado de cierre técnico (escombreras)",
            "N° de obras temporales (planteles) con cierre técnico",
            "Autorización de cierre técnico del plantel (regente)",
            "Indicadores de Uso y Cierre Técnico de Escombreras",
            "Indicadores de Instalación y Cierre de Obras Temporales",
            "Plan de Manejo de Residuos (PMR)",
            "Plan de gestión de residuos peligrosos",
            "N° de inspecciones de manejo de residuos / N° inspecciones programadas",
        ],
    ),
    (
        "Gestión de Sustancias y Derrames",
        &[
            "N° de incidentes por derrames de hidrocarburos",
            "N° de eventos de capacitación en manejo de hidrocarburos",
            "Registros de mantenimiento de filtros, piletas y atención de derrames",
            "Plan de manejo de sustancias peligrosas",
            "N° de reportes de derrames atendidos / N° total de derrames",
            "N° de inspecciones de manejo de sustancias peligrosas / N° inspecciones programadas",
        ],
    ),
    (
        "Patrimonio Cultural",
        &[
            "N° de visitas del profesional en arqueología (si es necesario)",
            "N° de evidencia arqueológica",
            "Indicadores de Arqueología",
        ],
    ),
    (
        "Gestión Socioeconómica y SSO",
        &[
            "N° de quejas de terceros",
            "N° de multas o sanciones a transportistas",
            "Monitoreo de ruido",
            "Nº de señales viales colocadas y Nº de pasos peatonales",
            "Registros de colocación de vallas de protección",
            "Registros de capacitación al personal de la obra",
            "Cantidad de reportes de quejas por ruido y vibraciones",
            "Registro de permiso del Ministerio de Salud para campamentos",
            "N° de inspecciones de manejo de ruido / N° inspecciones programadas",
            "N° de inspecciones socioambientales / N° programadas",
            "N° de inspecciones de salud y seguridad / N° programadas",
            "N° de reportes de accidentes / N° total de horas trabajadas",
        ],
    ),
    (
        "Gestión de Proyecto y Cumplimiento",
        &[
            "Registro fotográfico de limpieza de accesos",
            "N° de vehículos con revisión técnica vehicular (RTV) al día",
            "Reporte de regencia ambiental (cierre técnico)",
            "Cierre técnico al final del proyecto: Notas de los profesionales...",
            "Planos de diseño del proyecto",
            "Registros de revisión de maquinaria y equipo",
            "Reportes de inspección de fugas en maquinaria y equipo",
        ],
    ),
];

// =============================================================================
// TESTS
// =============================================================================
