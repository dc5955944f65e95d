//! Typed UI text lookup: `(MessageKey, Locale) -> &'static str`.

use std::str::FromStr;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    /// Picks the first supported language tag in an `Accept-Language` header.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .filter_map(|tag| tag.trim().split('-').next())
            .find_map(|primary| primary.parse().ok())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Locale::Fr),
            "en" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

/// Every user-visible string the service can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    DescriptionTooShort,
    JobTitleRequired,
    TaskNameRequired,
    PersonaAndGoalRequired,
    TaskRequired,
    FiveTalentsRequired,
    SoftwareRequired,
    DiagnosticIncomplete,
    AnalysisFailed,
    AnalysisInProgress,
    VerdictResilient,
    VerdictTransition,
    VerdictExposed,
}

pub trait Translator: Send + Sync {
    fn translate(&self, key: MessageKey, locale: Locale) -> &'static str;
}

/// Built-in French / English tables.
pub struct StaticTranslations;

impl Translator for StaticTranslations {
    fn translate(&self, key: MessageKey, locale: Locale) -> &'static str {
        use MessageKey::*;
        match (key, locale) {
            (DescriptionTooShort, Locale::Fr) => {
                "La description du poste est trop courte (50 caractères minimum)."
            }
            (DescriptionTooShort, Locale::En) => {
                "The job description is too short (at least 50 characters)."
            }
            (JobTitleRequired, Locale::Fr) => "Veuillez indiquer l'intitulé du poste.",
            (JobTitleRequired, Locale::En) => "Please enter a job title.",
            (TaskNameRequired, Locale::Fr) => "Veuillez nommer la tâche.",
            (TaskNameRequired, Locale::En) => "Please give the task a name.",
            (PersonaAndGoalRequired, Locale::Fr) => {
                "Choisissez votre profil et votre objectif pour continuer."
            }
            (PersonaAndGoalRequired, Locale::En) => "Choose your profile and goal to continue.",
            (TaskRequired, Locale::Fr) => "Ajoutez au moins une tâche pour continuer.",
            (TaskRequired, Locale::En) => "Add at least one task to continue.",
            (FiveTalentsRequired, Locale::Fr) => "Sélectionnez exactement 5 talents.",
            (FiveTalentsRequired, Locale::En) => "Select exactly 5 talents.",
            (SoftwareRequired, Locale::Fr) => "Renseignez au moins un logiciel.",
            (SoftwareRequired, Locale::En) => "Enter at least one software tool.",
            (DiagnosticIncomplete, Locale::Fr) => {
                "Terminez le diagnostic avant d'accéder à la stratégie."
            }
            (DiagnosticIncomplete, Locale::En) => {
                "Complete the diagnostic before moving on to strategy."
            }
            (AnalysisFailed, Locale::Fr) => "L'analyse a échoué. Veuillez réessayer.",
            (AnalysisFailed, Locale::En) => "The analysis failed. Please try again.",
            (AnalysisInProgress, Locale::Fr) => "Une analyse est déjà en cours.",
            (AnalysisInProgress, Locale::En) => "An analysis is already running.",
            (VerdictResilient, Locale::Fr) => "Profil résilient",
            (VerdictResilient, Locale::En) => "Resilient profile",
            (VerdictTransition, Locale::Fr) => "Profil en transition",
            (VerdictTransition, Locale::En) => "Profile in transition",
            (VerdictExposed, Locale::Fr) => "Profil exposé",
            (VerdictExposed, Locale::En) => "Exposed profile",
        }
    }
}

/// Locale negotiated from `Accept-Language`, falling back to the configured default.
#[derive(Debug, Clone, Copy)]
pub struct RequestLocale(pub Locale);

#[async_trait]
impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Locale::from_accept_language)
            .unwrap_or(state.config.default_locale);
        Ok(RequestLocale(locale))
    }
}
