//! Validation battery for site settings
//!
//! Pure and synchronous. Errors block a commit; warnings are advisory.

use crate::contract::{SiteSettings, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

pub const POSTS_PER_PAGE_RANGE: (u32, u32) = (1, 100);
pub const PASSWORD_MIN_LENGTH_RANGE: (u32, u32) = (6, 32);
pub const IMAGE_QUALITY_RANGE: (u32, u32) = (1, 100);
/// Five minutes to thirty days
pub const SESSION_TIMEOUT_RANGE: (u32, u32) = (5, 43_200);
pub const MAX_META_DESCRIPTION_LENGTH: usize = 160;
pub const MIN_AUTOSAVE_INTERVAL_SECONDS: u32 = 10;
pub const REDIRECT_STATUS_CODES: [u16; 4] = [301, 302, 307, 308];

static GOOGLE_ANALYTICS_ID: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(G-[A-Z0-9]{4,}|UA-\d{4,10}-\d{1,4})$").ok());
static GOOGLE_TAG_MANAGER_ID: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^GTM-[A-Z0-9]+$").ok());
static EMAIL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

fn matches(pattern: &Lazy<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

/// Absolute URL check: a scheme, and a host for http(s)
pub fn is_absolute_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => match url.scheme() {
            "http" | "https" => url.host_str().is_some_and(|h| !h.is_empty()),
            _ => !url.cannot_be_a_base(),
        },
        Err(_) => false,
    }
}

fn check_range(
    result: &mut ValidationResult,
    path: &str,
    label: &str,
    value: u32,
    (min, max): (u32, u32),
) {
    if value < min || value > max {
        result.add_error(
            path,
            format!("{} must be between {} and {}", label, min, max),
        );
    }
}

/// Run every check over a complete settings value
pub fn validate_settings(settings: &SiteSettings) -> ValidationResult {
    let mut result = ValidationResult::new();
    validate_general(settings, &mut result);
    validate_seo_analytics(settings, &mut result);
    validate_user_management(settings, &mut result);
    validate_content_publishing(settings, &mut result);
    validate_security_privacy(settings, &mut result);
    validate_marketing_seo(settings, &mut result);
    result
}

fn validate_general(settings: &SiteSettings, result: &mut ValidationResult) {
    let general = &settings.general;

    if general.site_identity.site_title.trim().is_empty() {
        result.add_error("general.siteIdentity.siteTitle", "Site title is required");
    }

    let site_url = general.site_configuration.site_url.trim();
    if !site_url.is_empty() && !is_absolute_url(site_url) {
        result.add_error(
            "general.siteConfiguration.siteUrl",
            "Site URL must be a valid absolute URL",
        );
    }

    let admin_email = general.site_configuration.admin_email.trim();
    if !admin_email.is_empty() && !matches(&EMAIL, admin_email) {
        result.add_error(
            "general.siteConfiguration.adminEmail",
            "Admin email must be a valid email address",
        );
    }

    check_range(
        result,
        "general.content.postsPerPage",
        "Posts per page",
        general.content.posts_per_page,
        POSTS_PER_PAGE_RANGE,
    );
}

fn validate_seo_analytics(settings: &SiteSettings, result: &mut ValidationResult) {
    let seo = &settings.seo_analytics;

    let ga_id = seo.analytics.google_analytics_id.trim();
    if !ga_id.is_empty() && !matches(&GOOGLE_ANALYTICS_ID, ga_id) {
        result.add_warning(
            "seoAnalytics.analytics.googleAnalyticsId",
            "Google Analytics ID should look like G-XXXXXXXXXX or UA-XXXXXXX-X",
        );
    }

    let gtm_id = seo.analytics.google_tag_manager_id.trim();
    if !gtm_id.is_empty() && !matches(&GOOGLE_TAG_MANAGER_ID, gtm_id) {
        result.add_warning(
            "seoAnalytics.analytics.googleTagManagerId",
            "Google Tag Manager ID should look like GTM-XXXXXXX",
        );
    }

    if seo.meta_defaults.default_meta_description.chars().count() > MAX_META_DESCRIPTION_LENGTH {
        result.add_warning(
            "seoAnalytics.metaDefaults.defaultMetaDescription",
            format!(
                "Meta descriptions longer than {} characters are usually truncated by search engines",
                MAX_META_DESCRIPTION_LENGTH
            ),
        );
    }
}

fn validate_user_management(settings: &SiteSettings, result: &mut ValidationResult) {
    let users = &settings.user_management;

    check_range(
        result,
        "userManagement.registration.passwordRequirements.minLength",
        "Minimum password length",
        users.registration.password_requirements.min_length,
        PASSWORD_MIN_LENGTH_RANGE,
    );

    let default_role = &users.registration.default_role;
    if !users.roles.available_roles.iter().any(|r| r == default_role) {
        result.add_error(
            "userManagement.registration.defaultRole",
            format!("Default role '{}' is not an available role", default_role),
        );
    }
}

fn validate_content_publishing(settings: &SiteSettings, result: &mut ValidationResult) {
    let content = &settings.content_publishing;

    check_range(
        result,
        "contentPublishing.media.imageQuality",
        "Image quality",
        content.media.image_quality,
        IMAGE_QUALITY_RANGE,
    );

    if content.media.max_upload_size_mb == 0 {
        result.add_error(
            "contentPublishing.media.maxUploadSizeMb",
            "Maximum upload size must be greater than zero",
        );
    }

    if content.editor.enable_autosave
        && content.editor.autosave_interval_seconds < MIN_AUTOSAVE_INTERVAL_SECONDS
    {
        result.add_warning(
            "contentPublishing.editor.autosaveIntervalSeconds",
            format!(
                "Autosaving more often than every {} seconds may slow down the editor",
                MIN_AUTOSAVE_INTERVAL_SECONDS
            ),
        );
    }
}

fn validate_security_privacy(settings: &SiteSettings, result: &mut ValidationResult) {
    let security = &settings.security_privacy;

    check_range(
        result,
        "securityPrivacy.authentication.sessionTimeoutMinutes",
        "Session timeout (minutes)",
        security.authentication.session_timeout_minutes,
        SESSION_TIMEOUT_RANGE,
    );

    if security.authentication.max_login_attempts == 0 {
        result.add_error(
            "securityPrivacy.authentication.maxLoginAttempts",
            "Maximum login attempts must be at least 1",
        );
    }

    let policy_url = security.privacy.privacy_policy_url.trim();
    if !policy_url.is_empty() && !is_absolute_url(policy_url) {
        result.add_warning(
            "securityPrivacy.privacy.privacyPolicyUrl",
            "Privacy policy URL does not look like an absolute URL",
        );
    }
}

fn validate_marketing_seo(settings: &SiteSettings, result: &mut ValidationResult) {
    for (index, rule) in settings.marketing_seo.redirects.rules.iter().enumerate() {
        let base = format!("marketingSEO.redirects.rules.{}", index);

        if !rule.from.starts_with('/') {
            result.add_error(
                format!("{}.from", base),
                "Redirect source must be a site-relative path starting with '/'",
            );
        }
        if rule.to.trim().is_empty() {
            result.add_error(format!("{}.to", base), "Redirect target is required");
        }
        if !REDIRECT_STATUS_CODES.contains(&rule.status_code) {
            result.add_error(
                format!("{}.statusCode", base),
                format!(
                    "Redirect status must be one of {:?}, got {}",
                    REDIRECT_STATUS_CODES, rule.status_code
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::RedirectRule;
    use crate::domain::defaults::default_site_settings;

    #[test]
    fn test_posts_per_page_bounds() {
        for (value, valid) in [(0, false), (1, true), (50, true), (100, true), (101, false)] {
            let mut settings = default_site_settings();
            settings.general.content.posts_per_page = value;
            let result = validate_settings(&settings);
            assert_eq!(result.is_valid, valid, "postsPerPage={}", value);
            assert_eq!(result.has_error("general.content.postsPerPage"), !valid);
        }
    }

    #[test]
    fn test_site_title_required() {
        let mut settings = default_site_settings();
        settings.general.site_identity.site_title = "   ".to_string();
        let result = validate_settings(&settings);
        assert!(!result.is_valid);
        assert!(result.has_error("general.siteIdentity.siteTitle"));
    }

    #[test]
    fn test_site_url() {
        let mut settings = default_site_settings();
        settings.general.site_configuration.site_url = "not a url".to_string();
        assert!(validate_settings(&settings).has_error("general.siteConfiguration.siteUrl"));

        settings.general.site_configuration.site_url = "https://blog.example.com/".to_string();
        assert!(!validate_settings(&settings).has_error("general.siteConfiguration.siteUrl"));

        settings.general.site_configuration.site_url = String::new();
        assert!(validate_settings(&settings).is_valid);
    }

    #[test]
    fn test_analytics_id_mismatch_is_warning() {
        let mut settings = default_site_settings();
        settings.seo_analytics.analytics.google_analytics_id = "analytics-123".to_string();
        let result = validate_settings(&settings);
        assert!(result.is_valid);
        assert!(result.has_warning("seoAnalytics.analytics.googleAnalyticsId"));

        for id in ["G-ABCD1234", "UA-1234567-1"] {
            settings.seo_analytics.analytics.google_analytics_id = id.to_string();
            assert!(validate_settings(&settings).warnings.is_empty(), "{}", id);
        }
    }

    #[test]
    fn test_password_min_length_bounds() {
        let mut settings = default_site_settings();
        settings.user_management.registration.password_requirements.min_length = 4;
        let result = validate_settings(&settings);
        assert!(result.has_error("userManagement.registration.passwordRequirements.minLength"));

        settings.user_management.registration.password_requirements.min_length = 32;
        assert!(validate_settings(&settings).is_valid);
    }

    #[test]
    fn test_default_role_must_exist() {
        let mut settings = default_site_settings();
        settings.user_management.registration.default_role = "overlord".to_string();
        assert!(validate_settings(&settings).has_error("userManagement.registration.defaultRole"));
    }

    #[test]
    fn test_redirect_rules_are_checked_per_index() {
        let mut settings = default_site_settings();
        settings.marketing_seo.redirects.rules = vec![
            RedirectRule {
                from: "/ok".to_string(),
                to: "/fine".to_string(),
                status_code: 301,
            },
            RedirectRule {
                from: "missing-slash".to_string(),
                to: String::new(),
                status_code: 200,
            },
        ];
        let result = validate_settings(&settings);
        assert!(!result.is_valid);
        assert!(!result.has_error("marketingSEO.redirects.rules.0.from"));
        assert!(result.has_error("marketingSEO.redirects.rules.1.from"));
        assert!(result.has_error("marketingSEO.redirects.rules.1.to"));
        assert!(result.has_error("marketingSEO.redirects.rules.1.statusCode"));
    }

    #[test]
    fn test_collects_multiple_errors() {
        let mut settings = default_site_settings();
        settings.general.site_identity.site_title = String::new();
        settings.general.content.posts_per_page = 0;
        settings.security_privacy.authentication.max_login_attempts = 0;
        let result = validate_settings(&settings);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.error_messages().len(), 3);
    }

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("http://localhost:3000"));
        assert!(is_absolute_url("https://example.com/privacy"));
        assert!(!is_absolute_url("/relative/path"));
        assert!(!is_absolute_url("example.com"));
        assert!(!is_absolute_url("not a url"));
    }
}
