use super::*;
use std::collections::BTreeSet;
use tessera_types::constants::{DOMAIN_NAMESPACE, GROUP_NAMESPACE};
use tessera_types::execution::{CreateDomain, UpdateDomain, UpdateGroup};
use tessera_types::Domain;

impl<'a, S: State> Layer<'a, S> {
    // === Domain & Group Handlers ===

    /// Creates a domain and stores every group it defines.
    ///
    /// Besides the permission and reference rules, a defined group must be new: an id that is
    /// already stored, or listed twice, is rejected even when no permission references it, so
    /// creating a domain never overwrites an existing group.
    pub(in crate::layer) fn handle_create_domain(
        &mut self,
        context: &impl Context,
        act: &CreateDomain,
    ) -> Result<Event, ActionError> {
        require_authorized(context, DOMAIN_NAMESPACE, &act.name)?;
        if act.name.is_empty() {
            return Err(ActionError::EmptyField {
                field: "domain name",
            });
        }
        check_name("domain name", &act.name)?;
        if self.exists(&Key::Domain(act.name.clone()))? {
            return Err(ActionError::already_exists("domain", &act.name));
        }

        check_defined_groups(&act.groups)?;
        // New groups are persisted below, so none may already be stored or repeated.
        let mut seen = BTreeSet::new();
        for group in &act.groups {
            if !seen.insert(group.id) || self.exists(&Key::Group(group.id))? {
                return Err(ActionError::already_exists("group", group.id.to_string()));
            }
        }

        check_permission_shape(&act.issue, Role::Issue)?;
        check_permission_shape(&act.transfer, Role::Transfer)?;
        check_permission_shape(&act.manage, Role::Manage)?;

        self.check_permission_references(&act.issue, Role::Issue, &act.groups)?;
        self.check_permission_references(&act.transfer, Role::Transfer, &act.groups)?;
        self.check_permission_references(&act.manage, Role::Manage, &act.groups)?;

        let domain = Domain {
            name: act.name.clone(),
            issuer: act.issuer.clone(),
            issue_time: context.current_time(),
            issue: act.issue.clone(),
            transfer: act.transfer.clone(),
            manage: act.manage.clone(),
        };
        self.insert(Key::Domain(act.name.clone()), Value::Domain(domain));
        for group in &act.groups {
            self.insert(Key::Group(group.id), Value::Group(group.clone()));
        }

        Ok(Event::DomainCreated {
            name: act.name.clone(),
        })
    }

    pub(in crate::layer) fn handle_update_group(
        &mut self,
        context: &impl Context,
        act: &UpdateGroup,
    ) -> Result<Event, ActionError> {
        let subject = act.id.to_string();
        require_authorized(context, GROUP_NAMESPACE, &subject)?;
        if !self.exists(&Key::Group(act.id))? {
            return Err(ActionError::not_found("group", subject));
        }
        check_group_keys(&act.keys)?;

        let group = act.proposed();
        group
            .validate()
            .map_err(|reason| ActionError::MalformedThreshold {
                subject: format!("group {subject}"),
                reason,
            })?;

        self.insert(Key::Group(act.id), Value::Group(group));
        Ok(Event::GroupUpdated { id: act.id })
    }

    /// Replaces the permissions present in `act`.
    ///
    /// `act.groups` only serves to resolve references made by the new permissions; those groups
    /// are validated but not written to the group store.
    pub(in crate::layer) fn handle_update_domain(
        &mut self,
        context: &impl Context,
        act: &UpdateDomain,
    ) -> Result<Event, ActionError> {
        require_authorized(context, &act.name, MANAGE_PERMISSION)?;
        let mut domain = match self.get(&Key::Domain(act.name.clone()))? {
            Some(Value::Domain(domain)) => domain,
            _ => return Err(ActionError::not_found("domain", &act.name)),
        };

        check_defined_groups(&act.groups)?;
        if act.name.is_empty() {
            return Err(ActionError::EmptyField {
                field: "domain name",
            });
        }

        if let Some(issue) = &act.issue {
            check_permission_shape(issue, Role::Issue)?;
            self.check_permission_references(issue, Role::Issue, &act.groups)?;
        }
        if let Some(transfer) = &act.transfer {
            check_permission_shape(transfer, Role::Transfer)?;
            self.check_permission_references(transfer, Role::Transfer, &act.groups)?;
        }
        if let Some(manage) = &act.manage {
            check_permission_shape(manage, Role::Manage)?;
            self.check_permission_references(manage, Role::Manage, &act.groups)?;
        }

        if let Some(issue) = &act.issue {
            domain.issue = issue.clone();
        }
        if let Some(transfer) = &act.transfer {
            domain.transfer = transfer.clone();
        }
        if let Some(manage) = &act.manage {
            domain.manage = manage.clone();
        }
        self.insert(Key::Domain(act.name.clone()), Value::Domain(domain));

        Ok(Event::DomainUpdated {
            name: act.name.clone(),
        })
    }
}
