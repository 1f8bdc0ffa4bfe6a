//! Tests for capability info and connection profile types

use super::*;

mod server_info_tests {
    use super::*;

    fn info(major: u32, minor: u32) -> ServerInfo {
        ServerInfo {
            ods_major: major,
            ods_minor: minor,
            ..ServerInfo::default()
        }
    }

    #[test]
    fn test_ods_at_least_same_major() {
        assert!(info(11, 2).ods_at_least(11, 1));
        assert!(info(11, 1).ods_at_least(11, 1));
        assert!(!info(11, 0).ods_at_least(11, 1));
    }

    #[test]
    fn test_ods_at_least_higher_major_wins() {
        assert!(info(12, 0).ods_at_least(11, 1));
        assert!(!info(11, 9).ods_at_least(12, 0));
    }

    #[test]
    fn test_full_ods_and_size() {
        assert_eq!(info(11, 2).full_ods(), 112);
        let mut i = info(13, 0);
        i.page_size = 8192;
        i.pages = 1000;
        assert_eq!(i.size_in_bytes(), 8_192_000);
    }
}

mod authentication_mode_tests {
    use super::*;

    #[test]
    fn test_config_value_round_trip() {
        for mode in [
            AuthenticationMode::UseSavedPassword,
            AuthenticationMode::UseSavedEncryptedPwd,
            AuthenticationMode::AlwaysEnterPassword,
            AuthenticationMode::TrustedUser,
        ] {
            assert_eq!(
                AuthenticationMode::from_config_value(mode.config_value()),
                mode
            );
        }
    }

    #[test]
    fn test_unknown_token_falls_back_to_saved_password() {
        assert_eq!(
            AuthenticationMode::from_config_value("bogus"),
            AuthenticationMode::UseSavedPassword
        );
    }

    #[test]
    fn test_mode_flags() {
        assert!(AuthenticationMode::TrustedUser.ignores_username_password());
        assert!(AuthenticationMode::AlwaysEnterPassword.always_asks_for_password());
        assert!(AuthenticationMode::UseSavedEncryptedPwd.uses_encrypted_password());
        assert!(!AuthenticationMode::UseSavedPassword.uses_encrypted_password());
    }
}

mod connection_profile_tests {
    use super::*;

    #[test]
    fn test_connection_string_with_server() {
        let p = ConnectionProfile::new("emp", "localhost", "/data/employee.fdb");
        assert_eq!(p.connection_string(), "localhost:/data/employee.fdb");
    }

    #[test]
    fn test_connection_string_embedded() {
        let p = ConnectionProfile::new("emp", "", "employee.fdb");
        assert_eq!(p.connection_string(), "employee.fdb");
    }

    #[test]
    fn test_extract_name_strips_path_and_extension() {
        assert_eq!(
            ConnectionProfile::extract_name_from_connection_string("/srv/db/employee.fdb"),
            "employee"
        );
        assert_eq!(
            ConnectionProfile::extract_name_from_connection_string("C:\\db\\sales.fdb"),
            "sales"
        );
        assert_eq!(
            ConnectionProfile::extract_name_from_connection_string("alias"),
            "alias"
        );
    }

    #[test]
    fn test_display_name_falls_back_to_path() {
        let p = ConnectionProfile::new("", "srv", "/data/employee.fdb");
        assert_eq!(p.display_name(), "employee");
        let named = ConnectionProfile::new("Payroll", "srv", "/data/employee.fdb");
        assert_eq!(named.display_name(), "Payroll");
    }
}
