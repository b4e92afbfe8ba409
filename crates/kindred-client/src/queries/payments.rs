use async_trait::async_trait;

use kindred_shared::{PaymentMethod, PaymentMethodInput};

use crate::backend::Backend;
use crate::cache::{MutationSpec, QueryKey, QuerySpec};
use crate::error::Result;
use crate::queries::keys;

pub struct PaymentMethods;

#[async_trait]
impl QuerySpec for PaymentMethods {
    type Output = Vec<PaymentMethod>;

    fn key(&self) -> QueryKey {
        keys::payment_methods()
    }

    async fn run(&self, backend: &dyn Backend) -> Result<Vec<PaymentMethod>> {
        backend.get_saved_payment_methods().await
    }
}

/// The default-method pointer, compared against each record id.
pub struct DefaultPaymentMethod;

#[async_trait]
impl QuerySpec for DefaultPaymentMethod {
    type Output = Option<String>;

    fn key(&self) -> QueryKey {
        keys::default_payment_method()
    }

    async fn run(&self, backend: &dyn Backend) -> Result<Option<String>> {
        backend.get_default_payment_method().await
    }
}

// Any payment write may move the default pointer (removing the default
// record clears it), so every write refreshes both keys.
fn payment_keys() -> Vec<QueryKey> {
    vec![keys::payment_methods(), keys::default_payment_method()]
}

pub struct AddPaymentMethod {
    pub input: PaymentMethodInput,
}

#[async_trait]
impl MutationSpec for AddPaymentMethod {
    type Output = String;

    fn name(&self) -> &'static str {
        "addPaymentMethod"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<String> {
        backend.add_payment_method(self.input.clone()).await
    }

    fn invalidates(&self, _id: &String) -> Vec<QueryKey> {
        payment_keys()
    }
}

pub struct UpdatePaymentMethod {
    pub id: String,
    pub input: PaymentMethodInput,
}

#[async_trait]
impl MutationSpec for UpdatePaymentMethod {
    type Output = ();

    fn name(&self) -> &'static str {
        "updatePaymentMethod"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<()> {
        backend.update_payment_method(&self.id, self.input.clone()).await
    }

    fn invalidates(&self, _output: &()) -> Vec<QueryKey> {
        payment_keys()
    }
}

pub struct RemovePaymentMethod {
    pub id: String,
}

#[async_trait]
impl MutationSpec for RemovePaymentMethod {
    type Output = ();

    fn name(&self) -> &'static str {
        "removePaymentMethod"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<()> {
        backend.remove_payment_method(&self.id).await
    }

    fn invalidates(&self, _output: &()) -> Vec<QueryKey> {
        payment_keys()
    }
}

pub struct SetDefaultPaymentMethod {
    pub id: String,
}

#[async_trait]
impl MutationSpec for SetDefaultPaymentMethod {
    type Output = ();

    fn name(&self) -> &'static str {
        "setDefaultPaymentMethod"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<()> {
        backend.set_default_payment_method(&self.id).await
    }

    fn invalidates(&self, _output: &()) -> Vec<QueryKey> {
        payment_keys()
    }
}
