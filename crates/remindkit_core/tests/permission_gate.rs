use remindkit_core::{
    AlarmCapability, AuthorizationStatus, InMemoryNotifier, NotificationSettings, NotifierCall,
    PermissionGate,
};

fn settings(authorization: AuthorizationStatus, alarm: AlarmCapability) -> NotificationSettings {
    NotificationSettings {
        authorization,
        alarm,
    }
}

#[tokio::test]
async fn authorized_host_is_never_prompted() {
    let notifier = InMemoryNotifier::new();

    assert!(PermissionGate::new(&notifier).ensure_authorized().await);
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn missing_alarm_permission_is_fine_where_not_applicable() {
    let notifier = InMemoryNotifier::with_settings(settings(
        AuthorizationStatus::Authorized,
        AlarmCapability::NotApplicable,
    ));

    assert!(PermissionGate::new(&notifier).ensure_authorized().await);
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn undetermined_host_is_prompted_once_and_granted() {
    let notifier = InMemoryNotifier::with_settings(settings(
        AuthorizationStatus::NotDetermined,
        AlarmCapability::Enabled,
    ));
    notifier.grant_on_request(NotificationSettings::AUTHORIZED);

    assert!(PermissionGate::new(&notifier).ensure_authorized().await);
    assert_eq!(notifier.calls(), vec![NotifierCall::RequestAuthorization]);
}

#[tokio::test]
async fn disabled_alarms_send_user_to_settings_once() {
    let notifier = InMemoryNotifier::with_settings(settings(
        AuthorizationStatus::Authorized,
        AlarmCapability::Disabled,
    ));
    notifier.enable_alarm_on_settings_open(true);

    assert!(PermissionGate::new(&notifier).ensure_authorized().await);
    assert_eq!(notifier.calls(), vec![NotifierCall::OpenAlarmSettings]);
}

#[tokio::test]
async fn alarms_left_disabled_deny_without_looping() {
    let notifier = InMemoryNotifier::with_settings(settings(
        AuthorizationStatus::Authorized,
        AlarmCapability::Disabled,
    ));

    assert!(!PermissionGate::new(&notifier).ensure_authorized().await);
    assert_eq!(notifier.calls(), vec![NotifierCall::OpenAlarmSettings]);
}

#[tokio::test]
async fn denied_host_gets_single_remediation_cycle() {
    let notifier = InMemoryNotifier::with_settings(settings(
        AuthorizationStatus::Denied,
        AlarmCapability::Disabled,
    ));

    assert!(!PermissionGate::new(&notifier).ensure_authorized().await);
    assert_eq!(
        notifier.calls(),
        vec![
            NotifierCall::RequestAuthorization,
            NotifierCall::OpenAlarmSettings
        ]
    );
}

#[tokio::test]
async fn granted_notifications_without_alarms_still_deny() {
    let notifier = InMemoryNotifier::with_settings(settings(
        AuthorizationStatus::Denied,
        AlarmCapability::Disabled,
    ));
    notifier.grant_on_request(NotificationSettings::AUTHORIZED);

    // Only the authorization half of a prompt result is applied.
    assert!(!PermissionGate::new(&notifier).ensure_authorized().await);
    assert_eq!(
        notifier.calls(),
        vec![
            NotifierCall::RequestAuthorization,
            NotifierCall::OpenAlarmSettings
        ]
    );
}
