//! Contract layer - public API for in-process consumers
//!
//! Schema types, the mutation vocabulary and the native client trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::SiteSettingsApi;
pub use error::SettingsError;
pub use model::{
    AnalyticsSettings, AuthenticationSettings, CategoryPatch, CategorySettings,
    CommentSettings, ContentPublishingPatch, ContentPublishingSettings, ContentSettings,
    EditorSettings, ExportMetadata, FirewallSettings, GeneralPatch, GeneralSettings,
    MaintenanceSettings, MarketingSeoPatch, MarketingSeoSettings, MediaSettings, MetaDefaults,
    NewsletterSettings, PasswordPolicy, PrivacySettings, ProfileSettings, RedirectRule,
    RedirectSettings, RegistrationSettings, RoleSettings, SecurityPrivacyPatch,
    SecurityPrivacySettings, SeoAnalyticsPatch, SeoAnalyticsSettings, SeoTools,
    SettingsAction, SettingsCategory, SettingsExport, SettingsSnapshot, SiteConfiguration,
    SiteIdentity, SiteSettings, SiteSettingsPatch, SitemapSettings, SocialSettings,
    UpdateOutcome, UserManagementPatch, UserManagementSettings, ValidationResult,
    WorkflowSettings, EXPORT_VERSION,
};
