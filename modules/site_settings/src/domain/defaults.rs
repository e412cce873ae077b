//! Canonical default settings
//!
//! Used as the cold-start value and as the reset target. Must always pass
//! `validate_settings`.

use crate::contract::model::*;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Build a fully populated default `SiteSettings`
pub fn default_site_settings() -> SiteSettings {
    SiteSettings {
        general: GeneralSettings {
            site_identity: SiteIdentity {
                site_title: "My CMS Site".to_string(),
                tagline: "Just another CMS site".to_string(),
                site_logo: String::new(),
                favicon: String::new(),
            },
            site_configuration: SiteConfiguration {
                site_url: "http://localhost:3000".to_string(),
                admin_email: "admin@example.com".to_string(),
                language: "en-US".to_string(),
                timezone: "UTC".to_string(),
                date_format: "F j, Y".to_string(),
                time_format: "g:i a".to_string(),
                week_starts_on: "monday".to_string(),
            },
            content: ContentSettings {
                posts_per_page: 10,
                show_excerpts: true,
                default_post_category: "uncategorized".to_string(),
                default_post_format: "standard".to_string(),
            },
            maintenance: MaintenanceSettings {
                enabled: false,
                message: "We are performing scheduled maintenance. Please check back soon."
                    .to_string(),
            },
        },
        seo_analytics: SeoAnalyticsSettings {
            meta_defaults: MetaDefaults {
                default_meta_title: "My CMS Site".to_string(),
                default_meta_description: String::new(),
                default_keywords: Vec::new(),
                title_separator: "|".to_string(),
            },
            analytics: AnalyticsSettings {
                google_analytics_id: String::new(),
                google_tag_manager_id: String::new(),
                enable_tracking: false,
                anonymize_ip: true,
            },
            social: SocialSettings {
                open_graph_enabled: true,
                twitter_card_type: "summary_large_image".to_string(),
                default_share_image: String::new(),
            },
            sitemap: SitemapSettings {
                enabled: true,
                include_pages: true,
                include_posts: true,
                change_frequency: "weekly".to_string(),
            },
        },
        user_management: UserManagementSettings {
            registration: RegistrationSettings {
                allow_registration: false,
                default_role: "subscriber".to_string(),
                require_email_verification: true,
                password_requirements: PasswordPolicy {
                    min_length: 8,
                    require_uppercase: true,
                    require_lowercase: true,
                    require_numbers: true,
                    require_special_chars: false,
                },
            },
            profiles: ProfileSettings {
                allow_avatar_upload: true,
                show_author_bio: true,
            },
            roles: RoleSettings {
                available_roles: strings(&[
                    "administrator",
                    "editor",
                    "author",
                    "contributor",
                    "subscriber",
                ]),
            },
        },
        content_publishing: ContentPublishingSettings {
            editor: EditorSettings {
                default_editor: "rich-text".to_string(),
                enable_autosave: true,
                autosave_interval_seconds: 60,
                enable_revisions: true,
                max_revisions: 25,
            },
            media: MediaSettings {
                max_upload_size_mb: 10,
                allowed_file_types: strings(&["jpg", "jpeg", "png", "gif", "webp", "pdf"]),
                image_quality: 82,
                generate_thumbnails: true,
            },
            comments: CommentSettings {
                enable_comments: true,
                require_moderation: true,
                allow_anonymous: false,
                close_after_days: 0,
                thread_depth: 5,
            },
            workflow: WorkflowSettings {
                require_review: false,
                allow_scheduling: true,
                default_visibility: "public".to_string(),
            },
        },
        security_privacy: SecurityPrivacySettings {
            authentication: AuthenticationSettings {
                enable_two_factor: false,
                session_timeout_minutes: 120,
                max_login_attempts: 5,
                lockout_duration_minutes: 15,
            },
            privacy: PrivacySettings {
                cookie_consent_enabled: true,
                privacy_policy_url: String::new(),
                data_retention_days: 365,
                gdpr_compliance: true,
            },
            firewall: FirewallSettings {
                enable_rate_limiting: true,
                blocked_ips: Vec::new(),
                allowed_ips: Vec::new(),
            },
        },
        marketing_seo: MarketingSeoSettings {
            newsletter: NewsletterSettings {
                enabled: false,
                provider: "none".to_string(),
                list_id: String::new(),
            },
            redirects: RedirectSettings {
                enabled: true,
                rules: Vec::new(),
            },
            tools: SeoTools {
                robots_txt: "User-agent: *\nAllow: /".to_string(),
                canonical_urls: true,
                structured_data: true,
            },
        },
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        default_site_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::validate_settings;

    #[test]
    fn test_defaults_are_valid() {
        let result = validate_settings(&default_site_settings());
        assert!(result.is_valid, "defaults failed validation: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "defaults warn: {:?}", result.warnings);
    }

    #[test]
    fn test_defaults_are_deterministic() {
        assert_eq!(default_site_settings(), SiteSettings::default());
    }
}
