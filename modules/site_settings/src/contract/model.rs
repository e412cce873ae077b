//! Contract models for the site settings subsystem
//!
//! `SiteSettings` is the root aggregate: six independently addressable
//! categories, each a typed record. Serialized names are camelCase so that
//! setting paths read like `general.siteIdentity.siteTitle`.

use super::error::SettingsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Declares a settings record together with its partial-update type.
///
/// The patch mirrors every field as an `Option`; `apply_to` replaces exactly
/// the fields that are present and leaves the rest of the target untouched.
macro_rules! settings_section {
    (
        $(#[$meta:meta])*
        $name:ident => $patch:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        #[doc = concat!("Partial update for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        pub struct $patch {
            $(
                $(#[$fmeta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl $patch {
            /// Replace the target's fields with every field present in this patch
            pub fn apply_to(self, target: &mut $name) {
                $(
                    if let Some(value) = self.$field {
                        target.$field = value;
                    }
                )*
            }

            /// True when the patch carries no field at all
            pub fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )*
            }
        }
    };
}

/// Declares a plain nested record (no patch type).
macro_rules! settings_record {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }
    };
}

// ===== Root aggregate =====

settings_section! {
    /// Complete site configuration. Every category is always present.
    SiteSettings => SiteSettingsPatch {
        general: GeneralSettings,
        seo_analytics: SeoAnalyticsSettings,
        user_management: UserManagementSettings,
        content_publishing: ContentPublishingSettings,
        security_privacy: SecurityPrivacySettings,
        #[serde(rename = "marketingSEO")]
        marketing_seo: MarketingSeoSettings,
    }
}

// ===== general =====

settings_section! {
    /// Site identity, base configuration and front-page content options
    GeneralSettings => GeneralPatch {
        site_identity: SiteIdentity,
        site_configuration: SiteConfiguration,
        content: ContentSettings,
        maintenance: MaintenanceSettings,
    }
}

settings_record! {
    SiteIdentity {
        site_title: String,
        tagline: String,
        site_logo: String,
        favicon: String,
    }
}

settings_record! {
    SiteConfiguration {
        /// Absolute public URL of the site; empty when not configured
        site_url: String,
        admin_email: String,
        language: String,
        timezone: String,
        date_format: String,
        time_format: String,
        week_starts_on: String,
    }
}

settings_record! {
    ContentSettings {
        /// Number of posts on listing pages, 1..=100
        posts_per_page: u32,
        show_excerpts: bool,
        default_post_category: String,
        default_post_format: String,
    }
}

settings_record! {
    MaintenanceSettings {
        enabled: bool,
        message: String,
    }
}

// ===== seoAnalytics =====

settings_section! {
    /// Search metadata defaults and analytics integrations
    SeoAnalyticsSettings => SeoAnalyticsPatch {
        meta_defaults: MetaDefaults,
        analytics: AnalyticsSettings,
        social: SocialSettings,
        sitemap: SitemapSettings,
    }
}

settings_record! {
    MetaDefaults {
        default_meta_title: String,
        default_meta_description: String,
        default_keywords: Vec<String>,
        title_separator: String,
    }
}

settings_record! {
    AnalyticsSettings {
        /// GA4 (`G-XXXX`) or Universal Analytics (`UA-1234-1`) identifier
        google_analytics_id: String,
        google_tag_manager_id: String,
        enable_tracking: bool,
        anonymize_ip: bool,
    }
}

settings_record! {
    SocialSettings {
        open_graph_enabled: bool,
        twitter_card_type: String,
        default_share_image: String,
    }
}

settings_record! {
    SitemapSettings {
        enabled: bool,
        include_pages: bool,
        include_posts: bool,
        change_frequency: String,
    }
}

// ===== userManagement =====

settings_section! {
    /// Registration, profile and role configuration
    UserManagementSettings => UserManagementPatch {
        registration: RegistrationSettings,
        profiles: ProfileSettings,
        roles: RoleSettings,
    }
}

settings_record! {
    RegistrationSettings {
        allow_registration: bool,
        default_role: String,
        require_email_verification: bool,
        password_requirements: PasswordPolicy,
    }
}

settings_record! {
    PasswordPolicy {
        /// Minimum password length, 6..=32
        min_length: u32,
        require_uppercase: bool,
        require_lowercase: bool,
        require_numbers: bool,
        require_special_chars: bool,
    }
}

settings_record! {
    ProfileSettings {
        allow_avatar_upload: bool,
        show_author_bio: bool,
    }
}

settings_record! {
    RoleSettings {
        available_roles: Vec<String>,
    }
}

// ===== contentPublishing =====

settings_section! {
    /// Editor, media, comment and publishing workflow options
    ContentPublishingSettings => ContentPublishingPatch {
        editor: EditorSettings,
        media: MediaSettings,
        comments: CommentSettings,
        workflow: WorkflowSettings,
    }
}

settings_record! {
    EditorSettings {
        default_editor: String,
        enable_autosave: bool,
        autosave_interval_seconds: u32,
        enable_revisions: bool,
        max_revisions: u32,
    }
}

settings_record! {
    MediaSettings {
        max_upload_size_mb: u32,
        allowed_file_types: Vec<String>,
        /// JPEG quality, 1..=100
        image_quality: u32,
        generate_thumbnails: bool,
    }
}

settings_record! {
    CommentSettings {
        enable_comments: bool,
        require_moderation: bool,
        allow_anonymous: bool,
        /// 0 keeps comments open forever
        close_after_days: u32,
        thread_depth: u32,
    }
}

settings_record! {
    WorkflowSettings {
        require_review: bool,
        allow_scheduling: bool,
        default_visibility: String,
    }
}

// ===== securityPrivacy =====

settings_section! {
    /// Authentication hardening and privacy compliance
    SecurityPrivacySettings => SecurityPrivacyPatch {
        authentication: AuthenticationSettings,
        privacy: PrivacySettings,
        firewall: FirewallSettings,
    }
}

settings_record! {
    AuthenticationSettings {
        enable_two_factor: bool,
        session_timeout_minutes: u32,
        max_login_attempts: u32,
        lockout_duration_minutes: u32,
    }
}

settings_record! {
    PrivacySettings {
        cookie_consent_enabled: bool,
        privacy_policy_url: String,
        data_retention_days: u32,
        gdpr_compliance: bool,
    }
}

settings_record! {
    FirewallSettings {
        enable_rate_limiting: bool,
        blocked_ips: Vec<String>,
        allowed_ips: Vec<String>,
    }
}

// ===== marketingSEO =====

settings_section! {
    /// Newsletter integration, redirects and SEO tooling
    MarketingSeoSettings => MarketingSeoPatch {
        newsletter: NewsletterSettings,
        redirects: RedirectSettings,
        tools: SeoTools,
    }
}

settings_record! {
    NewsletterSettings {
        enabled: bool,
        provider: String,
        list_id: String,
    }
}

settings_record! {
    RedirectSettings {
        enabled: bool,
        rules: Vec<RedirectRule>,
    }
}

settings_record! {
    /// A single `from -> to` redirect
    RedirectRule {
        from: String,
        to: String,
        status_code: u16,
    }
}

settings_record! {
    SeoTools {
        robots_txt: String,
        canonical_urls: bool,
        structured_data: bool,
    }
}

// ===== Categories =====

/// One of the six top-level sections of [`SiteSettings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SettingsCategory {
    #[serde(rename = "general")]
    General,
    #[serde(rename = "seoAnalytics")]
    SeoAnalytics,
    #[serde(rename = "userManagement")]
    UserManagement,
    #[serde(rename = "contentPublishing")]
    ContentPublishing,
    #[serde(rename = "securityPrivacy")]
    SecurityPrivacy,
    #[serde(rename = "marketingSEO")]
    MarketingSeo,
}

impl SettingsCategory {
    /// All categories in schema order
    pub const ALL: [SettingsCategory; 6] = [
        SettingsCategory::General,
        SettingsCategory::SeoAnalytics,
        SettingsCategory::UserManagement,
        SettingsCategory::ContentPublishing,
        SettingsCategory::SecurityPrivacy,
        SettingsCategory::MarketingSeo,
    ];

    /// Serialized key of the category, also the first segment of its paths
    pub fn key(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::SeoAnalytics => "seoAnalytics",
            Self::UserManagement => "userManagement",
            Self::ContentPublishing => "contentPublishing",
            Self::SecurityPrivacy => "securityPrivacy",
            Self::MarketingSeo => "marketingSEO",
        }
    }
}

impl fmt::Display for SettingsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SettingsCategory {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.key() == s)
            .ok_or_else(|| SettingsError::UnknownCategory {
                name: s.to_string(),
            })
    }
}

/// Typed snapshot of a single category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySettings {
    General(GeneralSettings),
    SeoAnalytics(SeoAnalyticsSettings),
    UserManagement(UserManagementSettings),
    ContentPublishing(ContentPublishingSettings),
    SecurityPrivacy(SecurityPrivacySettings),
    MarketingSeo(MarketingSeoSettings),
}

impl CategorySettings {
    pub fn category(&self) -> SettingsCategory {
        match self {
            Self::General(_) => SettingsCategory::General,
            Self::SeoAnalytics(_) => SettingsCategory::SeoAnalytics,
            Self::UserManagement(_) => SettingsCategory::UserManagement,
            Self::ContentPublishing(_) => SettingsCategory::ContentPublishing,
            Self::SecurityPrivacy(_) => SettingsCategory::SecurityPrivacy,
            Self::MarketingSeo(_) => SettingsCategory::MarketingSeo,
        }
    }

    /// JSON form of the category, as the settings UI consumes it
    pub fn to_value(&self) -> Result<serde_json::Value, SettingsError> {
        let value = match self {
            Self::General(c) => serde_json::to_value(c),
            Self::SeoAnalytics(c) => serde_json::to_value(c),
            Self::UserManagement(c) => serde_json::to_value(c),
            Self::ContentPublishing(c) => serde_json::to_value(c),
            Self::SecurityPrivacy(c) => serde_json::to_value(c),
            Self::MarketingSeo(c) => serde_json::to_value(c),
        };
        value.map_err(|_| SettingsError::Internal)
    }
}

impl SiteSettings {
    /// Clone out one category
    pub fn category(&self, category: SettingsCategory) -> CategorySettings {
        match category {
            SettingsCategory::General => CategorySettings::General(self.general.clone()),
            SettingsCategory::SeoAnalytics => {
                CategorySettings::SeoAnalytics(self.seo_analytics.clone())
            }
            SettingsCategory::UserManagement => {
                CategorySettings::UserManagement(self.user_management.clone())
            }
            SettingsCategory::ContentPublishing => {
                CategorySettings::ContentPublishing(self.content_publishing.clone())
            }
            SettingsCategory::SecurityPrivacy => {
                CategorySettings::SecurityPrivacy(self.security_privacy.clone())
            }
            SettingsCategory::MarketingSeo => {
                CategorySettings::MarketingSeo(self.marketing_seo.clone())
            }
        }
    }
}

/// A partial update confined to one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryPatch {
    General(GeneralPatch),
    SeoAnalytics(SeoAnalyticsPatch),
    UserManagement(UserManagementPatch),
    ContentPublishing(ContentPublishingPatch),
    SecurityPrivacy(SecurityPrivacyPatch),
    MarketingSeo(MarketingSeoPatch),
}

impl CategoryPatch {
    pub fn category(&self) -> SettingsCategory {
        match self {
            Self::General(_) => SettingsCategory::General,
            Self::SeoAnalytics(_) => SettingsCategory::SeoAnalytics,
            Self::UserManagement(_) => SettingsCategory::UserManagement,
            Self::ContentPublishing(_) => SettingsCategory::ContentPublishing,
            Self::SecurityPrivacy(_) => SettingsCategory::SecurityPrivacy,
            Self::MarketingSeo(_) => SettingsCategory::MarketingSeo,
        }
    }

    /// Merge into the matching category of `target`
    pub fn apply_to(self, target: &mut SiteSettings) {
        match self {
            Self::General(p) => p.apply_to(&mut target.general),
            Self::SeoAnalytics(p) => p.apply_to(&mut target.seo_analytics),
            Self::UserManagement(p) => p.apply_to(&mut target.user_management),
            Self::ContentPublishing(p) => p.apply_to(&mut target.content_publishing),
            Self::SecurityPrivacy(p) => p.apply_to(&mut target.security_privacy),
            Self::MarketingSeo(p) => p.apply_to(&mut target.marketing_seo),
        }
    }

    /// Build a typed patch from an untyped JSON object
    ///
    /// Unknown fields and values of the wrong shape are rejected with
    /// [`SettingsError::TypeMismatch`].
    pub fn from_json(
        category: SettingsCategory,
        value: serde_json::Value,
    ) -> Result<Self, SettingsError> {
        fn typed<T: serde::de::DeserializeOwned>(
            category: SettingsCategory,
            value: serde_json::Value,
        ) -> Result<T, SettingsError> {
            serde_json::from_value(value).map_err(|e| SettingsError::TypeMismatch {
                path: category.key().to_string(),
                details: e.to_string(),
            })
        }

        Ok(match category {
            SettingsCategory::General => Self::General(typed(category, value)?),
            SettingsCategory::SeoAnalytics => Self::SeoAnalytics(typed(category, value)?),
            SettingsCategory::UserManagement => Self::UserManagement(typed(category, value)?),
            SettingsCategory::ContentPublishing => {
                Self::ContentPublishing(typed(category, value)?)
            }
            SettingsCategory::SecurityPrivacy => Self::SecurityPrivacy(typed(category, value)?),
            SettingsCategory::MarketingSeo => Self::MarketingSeo(typed(category, value)?),
        })
    }
}

// ===== Actions =====

/// Closed set of mutations accepted by `dispatch`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingsAction {
    UpdateGeneral(GeneralPatch),
    UpdateSeoAnalytics(SeoAnalyticsPatch),
    UpdateUserManagement(UserManagementPatch),
    UpdateContentPublishing(ContentPublishingPatch),
    UpdateSecurityPrivacy(SecurityPrivacyPatch),
    UpdateMarketingSeo(MarketingSeoPatch),
    ResetToDefaults,
    ImportSettings(Box<SiteSettings>),
}

impl SettingsAction {
    /// Action name for logs and audit records
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateGeneral(_) => "UPDATE_GENERAL",
            Self::UpdateSeoAnalytics(_) => "UPDATE_SEO_ANALYTICS",
            Self::UpdateUserManagement(_) => "UPDATE_USER_MANAGEMENT",
            Self::UpdateContentPublishing(_) => "UPDATE_CONTENT_PUBLISHING",
            Self::UpdateSecurityPrivacy(_) => "UPDATE_SECURITY_PRIVACY",
            Self::UpdateMarketingSeo(_) => "UPDATE_MARKETING_SEO",
            Self::ResetToDefaults => "RESET_TO_DEFAULTS",
            Self::ImportSettings(_) => "IMPORT_SETTINGS",
        }
    }
}

impl From<CategoryPatch> for SettingsAction {
    fn from(patch: CategoryPatch) -> Self {
        match patch {
            CategoryPatch::General(p) => Self::UpdateGeneral(p),
            CategoryPatch::SeoAnalytics(p) => Self::UpdateSeoAnalytics(p),
            CategoryPatch::UserManagement(p) => Self::UpdateUserManagement(p),
            CategoryPatch::ContentPublishing(p) => Self::UpdateContentPublishing(p),
            CategoryPatch::SecurityPrivacy(p) => Self::UpdateSecurityPrivacy(p),
            CategoryPatch::MarketingSeo(p) => Self::UpdateMarketingSeo(p),
        }
    }
}

// ===== Validation =====

/// Outcome of running the validation battery over a settings value
///
/// Errors block a commit, warnings never do. Both are keyed by setting path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: BTreeMap<String, Vec<String>>,
    pub warnings: BTreeMap<String, Vec<String>>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: BTreeMap::new(),
            warnings: BTreeMap::new(),
        }
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a blocking error at `path`
    pub fn add_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(path.into())
            .or_default()
            .push(message.into());
        self.is_valid = false;
    }

    /// Record an advisory warning at `path`
    pub fn add_warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    pub fn has_error(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn has_warning(&self, path: &str) -> bool {
        self.warnings.contains_key(path)
    }

    /// Every error message, one entry per message, in path order
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .values()
            .flat_map(|messages| messages.iter().cloned())
            .collect()
    }
}

/// Result of a mutation that reached validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// True when the new value was validated and persisted
    pub success: bool,
    pub validation: ValidationResult,
}

impl UpdateOutcome {
    pub fn committed(validation: ValidationResult) -> Self {
        Self {
            success: true,
            validation,
        }
    }

    pub fn rejected(validation: ValidationResult) -> Self {
        Self {
            success: false,
            validation,
        }
    }
}

/// Settings value together with the persisted revision it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSnapshot {
    /// 0 when nothing has been persisted yet
    pub revision: u64,
    pub settings: SiteSettings,
}

// ===== Export =====

/// Version written into every export envelope
pub const EXPORT_VERSION: &str = "1.0.0";

/// Versioned, self-describing snapshot used for export and import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsExport {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub settings: SiteSettings,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub site_name: String,
    pub exported_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::defaults::default_site_settings;
    use serde_json::json;

    #[test]
    fn test_category_keys_round_trip() {
        for category in SettingsCategory::ALL {
            let parsed: SettingsCategory = category.key().parse().unwrap();
            assert_eq!(parsed, category);
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                json!(category.key())
            );
        }
        assert!(matches!(
            "themes".parse::<SettingsCategory>(),
            Err(SettingsError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_category_value_matches_document_section() {
        let settings = default_site_settings();
        let whole = serde_json::to_value(&settings).unwrap();
        for category in SettingsCategory::ALL {
            let section = settings.category(category);
            assert_eq!(section.category(), category);
            assert_eq!(section.to_value().unwrap(), whole[category.key()]);
        }

        let seo = settings
            .category(SettingsCategory::MarketingSeo)
            .to_value()
            .unwrap();
        assert!(seo.get("redirects").is_some());
    }

    #[test]
    fn test_site_settings_serializes_category_keys() {
        let value = serde_json::to_value(default_site_settings()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for category in SettingsCategory::ALL {
            assert!(keys.contains(&category.key()), "missing {}", category);
        }
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut settings = default_site_settings();
        let original = settings.clone();

        let mut maintenance = original.general.maintenance.clone();
        maintenance.enabled = true;
        let patch = GeneralPatch {
            maintenance: Some(maintenance.clone()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut settings.general);

        assert_eq!(settings.general.maintenance, maintenance);
        assert_eq!(settings.general.site_identity, original.general.site_identity);
        assert_eq!(settings.seo_analytics, original.seo_analytics);
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result = CategoryPatch::from_json(
            SettingsCategory::General,
            json!({ "siteIdentityTypo": {} }),
        );
        assert!(matches!(result, Err(SettingsError::TypeMismatch { .. })));
    }

    #[test]
    fn test_action_wire_format() {
        let value = serde_json::to_value(SettingsAction::ResetToDefaults).unwrap();
        assert_eq!(value, json!({ "type": "RESET_TO_DEFAULTS" }));

        let action: SettingsAction = serde_json::from_value(json!({
            "type": "UPDATE_MARKETING_SEO",
            "payload": { "tools": { "robotsTxt": "", "canonicalUrls": true, "structuredData": false } }
        }))
        .unwrap();
        assert_eq!(action.name(), "UPDATE_MARKETING_SEO");
    }

    #[test]
    fn test_validation_result_tracks_validity() {
        let mut result = ValidationResult::new();
        assert!(result.is_valid);

        result.add_warning("a.b", "looks odd");
        assert!(result.is_valid);

        result.add_error("a.c", "first");
        result.add_error("a.c", "second");
        assert!(!result.is_valid);
        assert_eq!(result.error_messages(), vec!["first", "second"]);
    }
}
