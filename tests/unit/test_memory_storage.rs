#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rental_marketplace_api::api::models::{
        ApprovalStatus, BookingStatus, LeaseStatus, NewBooking, NewLease, NewPayment, NewProperty,
        NewService, NewServiceBooking, NewUser, PaymentMethod, PaymentStatus, Service,
        ServiceBookingStatus, UserRole,
    };
    use rental_marketplace_api::api::storage::{
        MemoryStorageBackend, PropertyQuery, RecordScope, StorageBackend, StorageError,
    };

    async fn user(store: &MemoryStorageBackend, name: &str, role: UserRole) -> i64 {
        store
            .create_user(NewUser::new(
                name.to_string(),
                format!("{}@example.com", name),
                "hash".to_string(),
                role,
            ))
            .await
            .unwrap()
            .id
    }

    async fn property(store: &MemoryStorageBackend, landlord_id: i64, price: f64) -> i64 {
        store
            .create_property(NewProperty {
                landlord_id,
                name: format!("Flat at {}", price),
                description: None,
                location: "Leeds".to_string(),
                price,
                property_type: "apartment".to_string(),
                bedrooms: 2,
                bathrooms: 1,
                square_feet: None,
                available: true,
                amenities: vec!["parking".to_string()],
                images: Vec::new(),
                latitude: None,
                longitude: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn booking(store: &MemoryStorageBackend, tenant_id: i64, property_id: i64) -> i64 {
        store
            .create_booking(NewBooking {
                tenant_id,
                property_id,
                message: None,
            })
            .await
            .unwrap()
            .id
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_user_uniqueness() {
        let store = MemoryStorageBackend::new();
        user(&store, "tom", UserRole::Tenant).await;

        let duplicate_name = store
            .create_user(NewUser::new(
                "tom".to_string(),
                "other@example.com".to_string(),
                "hash".to_string(),
                UserRole::Tenant,
            ))
            .await;
        assert!(matches!(
            duplicate_name,
            Err(StorageError::Conflict { field }) if field == "username"
        ));

        let duplicate_email = store
            .create_user(NewUser::new(
                "thomas".to_string(),
                "tom@example.com".to_string(),
                "hash".to_string(),
                UserRole::Tenant,
            ))
            .await;
        assert!(matches!(
            duplicate_email,
            Err(StorageError::Conflict { field }) if field == "email"
        ));

        let found = store.get_user_by_email("tom@example.com").await.unwrap();
        assert_eq!(found.unwrap().username, "tom");
        assert!(store.get_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_approval_status() {
        let store = MemoryStorageBackend::new();
        let id = user(&store, "lena", UserRole::Landlord).await;

        let updated = store
            .set_approval_status(id, ApprovalStatus::Approved)
            .await
            .unwrap();
        assert!(updated.is_approved());

        let missing = store.set_approval_status(99, ApprovalStatus::Approved).await;
        assert!(matches!(missing, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_property_listing_is_filtered_and_newest_first() {
        let store = MemoryStorageBackend::new();
        let landlord = user(&store, "lena", UserRole::Landlord).await;
        let rival = user(&store, "rick", UserRole::Landlord).await;
        let cheap = property(&store, landlord, 600.0).await;
        let dear = property(&store, landlord, 1500.0).await;
        property(&store, rival, 900.0).await;

        let all = store.list_properties(&PropertyQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].id, cheap);

        let mine = store
            .list_properties(&PropertyQuery {
                landlord_id: Some(landlord),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<i64> = mine.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![dear, cheap]);

        let orphan = store
            .create_property(NewProperty {
                landlord_id: 404,
                name: "Nowhere".to_string(),
                description: None,
                location: "Leeds".to_string(),
                price: 1.0,
                property_type: "flat".to_string(),
                bedrooms: 0,
                bathrooms: 0,
                square_feet: None,
                available: true,
                amenities: Vec::new(),
                images: Vec::new(),
                latitude: None,
                longitude: None,
            })
            .await;
        assert!(orphan.is_err());
    }

    #[tokio::test]
    async fn test_booking_status_updates_property_availability() {
        let store = MemoryStorageBackend::new();
        let landlord = user(&store, "lena", UserRole::Landlord).await;
        let tenant = user(&store, "tom", UserRole::Tenant).await;
        let property_id = property(&store, landlord, 950.0).await;
        let booking_id = booking(&store, tenant, property_id).await;

        let open = store.find_open_booking(tenant, property_id).await.unwrap();
        assert_eq!(open.map(|b| b.id), Some(booking_id));

        let approved = store
            .update_booking_status(
                booking_id,
                BookingStatus::Pending,
                BookingStatus::Approved,
                Some("Welcome".to_string()),
                Some(false),
            )
            .await
            .unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);
        assert_eq!(approved.landlord_response.as_deref(), Some("Welcome"));
        let listed = store.get_property(property_id).await.unwrap().unwrap();
        assert!(!listed.available);

        // A missing response leaves the previous one in place
        let cancelled = store
            .update_booking_status(
                booking_id,
                BookingStatus::Approved,
                BookingStatus::Cancelled,
                None,
                Some(true),
            )
            .await
            .unwrap();
        assert_eq!(cancelled.landlord_response.as_deref(), Some("Welcome"));
        assert!(store.get_property(property_id).await.unwrap().unwrap().available);
        assert!(store
            .find_open_booking(tenant, property_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_approval_needs_an_available_property() {
        let store = MemoryStorageBackend::new();
        let landlord = user(&store, "lena", UserRole::Landlord).await;
        let tenant = user(&store, "tom", UserRole::Tenant).await;
        let other = user(&store, "sam", UserRole::Tenant).await;
        let property_id = property(&store, landlord, 950.0).await;
        let first = booking(&store, tenant, property_id).await;
        let second = booking(&store, other, property_id).await;

        store
            .update_booking_status(
                first,
                BookingStatus::Pending,
                BookingStatus::Approved,
                None,
                Some(false),
            )
            .await
            .unwrap();
        let taken = store
            .update_booking_status(
                second,
                BookingStatus::Pending,
                BookingStatus::Approved,
                None,
                Some(false),
            )
            .await;
        assert!(matches!(
            taken,
            Err(StorageError::StaleWrite { ref entity, .. }) if entity == "Property"
        ));
        let untouched = store.get_booking(second).await.unwrap().unwrap();
        assert_eq!(untouched.status, BookingStatus::Pending);

        let stale = store
            .update_booking_status(
                first,
                BookingStatus::Pending,
                BookingStatus::Rejected,
                None,
                None,
            )
            .await;
        assert!(matches!(stale, Err(StorageError::StaleWrite { .. })));
        let missing = store
            .update_booking_status(
                99,
                BookingStatus::Pending,
                BookingStatus::Rejected,
                None,
                None,
            )
            .await;
        assert!(matches!(missing, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_status_writes_check_the_stored_status() {
        let store = MemoryStorageBackend::new();
        let landlord = user(&store, "lena", UserRole::Landlord).await;
        let tenant = user(&store, "tom", UserRole::Tenant).await;
        let property_id = property(&store, landlord, 950.0).await;

        let mut payment = store
            .create_payment(NewPayment {
                tenant_id: tenant,
                property_id,
                lease_id: None,
                amount: 950.0,
                method: PaymentMethod::Cash,
                due_date: None,
                notes: None,
            })
            .await
            .unwrap();
        payment.status = PaymentStatus::Completed;
        let stale = store
            .update_payment(payment.clone(), PaymentStatus::Failed)
            .await;
        assert!(matches!(stale, Err(StorageError::StaleWrite { .. })));
        let done = store
            .update_payment(payment.clone(), PaymentStatus::Pending)
            .await
            .unwrap();
        assert_eq!(done.status, PaymentStatus::Completed);
        assert!(
            store
                .update_payment(payment, PaymentStatus::Pending)
                .await
                .is_err()
        );

        let mut lease = store
            .create_lease(NewLease {
                property_id,
                tenant_id: tenant,
                landlord_id: landlord,
                monthly_rent: 950.0,
                security_deposit: 950.0,
                start_date: date(2024, 1, 1),
                end_date: date(2025, 1, 1),
                lease_duration_months: 12,
                pet_deposit: None,
                utilities_included: false,
                parking_included: false,
            })
            .await
            .unwrap();
        lease.status = LeaseStatus::Terminated;
        let stale = store.update_lease(lease.clone(), LeaseStatus::Active).await;
        assert!(matches!(stale, Err(StorageError::StaleWrite { .. })));
        let ended = store
            .update_lease(lease, LeaseStatus::Pending)
            .await
            .unwrap();
        assert_eq!(ended.status, LeaseStatus::Terminated);

        let service = store
            .create_service(NewService {
                name: "Cleaning".to_string(),
                description: None,
                rate: 30.0,
                is_active: true,
            })
            .await
            .unwrap();
        let request = store
            .create_service_booking(NewServiceBooking {
                tenant_id: tenant,
                property_id,
                service_id: service.id,
                requested_date: date(2024, 5, 1),
                notes: None,
            })
            .await
            .unwrap();
        store
            .update_service_booking_status(
                request.id,
                ServiceBookingStatus::Pending,
                ServiceBookingStatus::Rejected,
            )
            .await
            .unwrap();
        let stale = store
            .update_service_booking_status(
                request.id,
                ServiceBookingStatus::Pending,
                ServiceBookingStatus::Approved,
            )
            .await;
        assert!(matches!(stale, Err(StorageError::StaleWrite { .. })));
    }

    #[tokio::test]
    async fn test_payment_listing_limit() {
        let store = MemoryStorageBackend::new();
        let landlord = user(&store, "lena", UserRole::Landlord).await;
        let tenant = user(&store, "tom", UserRole::Tenant).await;
        let property_id = property(&store, landlord, 950.0).await;
        for amount in 1..=5 {
            store
                .create_payment(NewPayment {
                    tenant_id: tenant,
                    property_id,
                    lease_id: None,
                    amount: amount as f64,
                    method: PaymentMethod::BankTransfer,
                    due_date: None,
                    notes: None,
                })
                .await
                .unwrap();
        }

        let recent = store
            .list_payments(RecordScope::Tenant(tenant), Some(2))
            .await
            .unwrap();
        let amounts: Vec<f64> = recent.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![5.0, 4.0]);
        assert_eq!(
            store
                .list_payments(RecordScope::All, None)
                .await
                .unwrap()
                .len(),
            5
        );
    }

    #[tokio::test]
    async fn test_record_scopes() {
        let store = MemoryStorageBackend::new();
        let landlord = user(&store, "lena", UserRole::Landlord).await;
        let rival = user(&store, "rick", UserRole::Landlord).await;
        let tenant = user(&store, "tom", UserRole::Tenant).await;
        let other = user(&store, "sam", UserRole::Tenant).await;
        let mine = property(&store, landlord, 950.0).await;
        let theirs = property(&store, rival, 700.0).await;

        booking(&store, tenant, mine).await;
        booking(&store, other, mine).await;
        let latest = booking(&store, tenant, theirs).await;

        let cases = [
            (RecordScope::All, 3),
            (RecordScope::Tenant(tenant), 2),
            (RecordScope::Tenant(other), 1),
            (RecordScope::Landlord(landlord), 2),
            (RecordScope::Landlord(rival), 1),
        ];
        for (scope, expected) in cases {
            let visible = store.list_bookings(scope).await.unwrap();
            assert_eq!(visible.len(), expected, "{:?}", scope);
        }

        let all = store.list_bookings(RecordScope::All).await.unwrap();
        assert_eq!(all[0].id, latest);
    }

    #[tokio::test]
    async fn test_delete_property_cascades() {
        let store = MemoryStorageBackend::new();
        let landlord = user(&store, "lena", UserRole::Landlord).await;
        let tenant = user(&store, "tom", UserRole::Tenant).await;
        let doomed = property(&store, landlord, 950.0).await;
        let kept = property(&store, landlord, 700.0).await;

        booking(&store, tenant, doomed).await;
        booking(&store, tenant, kept).await;
        store
            .create_payment(NewPayment {
                tenant_id: tenant,
                property_id: doomed,
                lease_id: None,
                amount: 950.0,
                method: PaymentMethod::Cash,
                due_date: None,
                notes: None,
            })
            .await
            .unwrap();
        store
            .create_lease(NewLease {
                property_id: doomed,
                tenant_id: tenant,
                landlord_id: landlord,
                monthly_rent: 950.0,
                security_deposit: 950.0,
                start_date: date(2024, 1, 1),
                end_date: date(2025, 1, 1),
                lease_duration_months: 12,
                pet_deposit: None,
                utilities_included: false,
                parking_included: false,
            })
            .await
            .unwrap();

        store.delete_property(doomed).await.unwrap();

        assert!(store.get_property(doomed).await.unwrap().is_none());
        let bookings = store.list_bookings(RecordScope::All).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].property_id, kept);
        assert!(
            store
                .list_payments(RecordScope::All, None)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(store.list_leases(RecordScope::All).await.unwrap().is_empty());

        assert!(matches!(
            store.delete_property(doomed).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryStorageBackend::new();
        let landlord = user(&store, "lena", UserRole::Landlord).await;
        let rival = user(&store, "rick", UserRole::Landlord).await;
        let tenant = user(&store, "tom", UserRole::Tenant).await;
        let first = property(&store, landlord, 950.0).await;
        let second = property(&store, landlord, 800.0).await;
        let survivor = property(&store, rival, 700.0).await;

        booking(&store, tenant, first).await;
        booking(&store, tenant, second).await;
        booking(&store, tenant, survivor).await;

        let deletion = store.delete_user(landlord).await.unwrap();
        assert_eq!(deletion.properties_deleted, 2);
        assert_eq!(deletion.bookings_deleted, 2);
        assert!(store.get_user(landlord).await.unwrap().is_none());

        let left = store.list_properties(&PropertyQuery::default()).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, survivor);

        let deletion = store.delete_user(tenant).await.unwrap();
        assert_eq!(deletion.properties_deleted, 0);
        assert_eq!(deletion.bookings_deleted, 1);
        assert!(store.list_bookings(RecordScope::All).await.unwrap().is_empty());

        assert!(store.delete_user(tenant).await.is_err());
    }

    #[tokio::test]
    async fn test_services_and_service_bookings() {
        let store = MemoryStorageBackend::new();
        let landlord = user(&store, "lena", UserRole::Landlord).await;
        let tenant = user(&store, "tom", UserRole::Tenant).await;
        let property_id = property(&store, landlord, 950.0).await;

        let catalog = [
            ("Window cleaning", true),
            ("Boiler service", false),
            ("Carpet", true),
        ];
        for (name, active) in catalog {
            store
                .create_service(NewService {
                    name: name.to_string(),
                    description: None,
                    rate: 50.0,
                    is_active: active,
                })
                .await
                .unwrap();
        }

        let names = |services: Vec<Service>| services.into_iter().map(|s| s.name).collect::<Vec<_>>();
        assert_eq!(
            names(store.list_services(false).await.unwrap()),
            vec!["Boiler service", "Carpet", "Window cleaning"]
        );
        let active = store.list_services(true).await.unwrap();
        assert_eq!(names(active.clone()), vec!["Carpet", "Window cleaning"]);

        let carpet = active[0].id;
        let request = store
            .create_service_booking(NewServiceBooking {
                tenant_id: tenant,
                property_id,
                service_id: carpet,
                requested_date: date(2024, 5, 1),
                notes: Some("Hallway only".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(
            store
                .list_service_bookings(RecordScope::Landlord(landlord))
                .await
                .unwrap()
                .len(),
            1
        );

        store.delete_service(carpet).await.unwrap();
        assert!(store.get_service_booking(request.id).await.unwrap().is_none());
        assert!(store.get_service(carpet).await.unwrap().is_none());
    }
}
