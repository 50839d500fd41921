use super::*;
use std::collections::BTreeSet;
use tessera_types::execution::{IssueTokens, TransferToken};
use tessera_types::Token;

fn token_key(domain: &str, name: &str) -> Key {
    Key::Token {
        domain: domain.to_string(),
        name: name.to_string(),
    }
}

impl<'a, S: State> Layer<'a, S> {
    // === Token Handlers ===

    pub(in crate::layer) fn handle_issue_tokens(
        &mut self,
        context: &impl Context,
        act: &IssueTokens,
    ) -> Result<Event, ActionError> {
        require_authorized(context, &act.domain, ISSUE_PERMISSION)?;
        if !self.exists(&Key::Domain(act.domain.clone()))? {
            return Err(ActionError::not_found("domain", &act.domain));
        }
        check_owner("token owner", &act.owner)?;

        // A name repeated within the request collides with its own first occurrence.
        let mut seen = BTreeSet::new();
        for name in &act.names {
            check_name("token name", name)?;
            if !seen.insert(name.as_str()) || self.exists(&token_key(&act.domain, name))? {
                return Err(ActionError::already_exists(
                    "token",
                    format!("{}-{}", act.domain, name),
                ));
            }
        }

        for name in &act.names {
            let token = Token {
                domain: act.domain.clone(),
                name: name.clone(),
                owner: act.owner.clone(),
            };
            self.insert(token_key(&act.domain, name), Value::Token(token));
        }

        Ok(Event::TokensIssued {
            domain: act.domain.clone(),
            names: act.names.clone(),
        })
    }

    pub(in crate::layer) fn handle_transfer_token(
        &mut self,
        context: &impl Context,
        act: &TransferToken,
    ) -> Result<Event, ActionError> {
        require_authorized(context, &act.domain, &act.name)?;
        let key = token_key(&act.domain, &act.name);
        let mut token = match self.get(&key)? {
            Some(Value::Token(token)) => token,
            _ => {
                return Err(ActionError::not_found(
                    "token",
                    format!("{}-{}", act.domain, act.name),
                ))
            }
        };
        check_owner("token owner", &act.to)?;

        token.owner = act.to.clone();
        self.insert(key, Value::Token(token));

        Ok(Event::TokenTransferred {
            domain: act.domain.clone(),
            name: act.name.clone(),
        })
    }
}
