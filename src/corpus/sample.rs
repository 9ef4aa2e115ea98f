//! Built-in sample corpus used when no dataset is supplied.

use super::{Corpus, Label, LabeledDocument};

/// Phishing examples of the sample corpus.
pub const SAMPLE_PHISHING: &[&str] = &[
    "Urgent: Your account has been compromised. Click here immediately to verify: http://suspicious-link.com/verify",
    "Dear Customer, Your account will be suspended in 24 hours. Verify now: http://fake-bank.com/login",
    "Congratulations! You've won $1,000,000! Claim your prize now: http://scam-site.com/claim",
    "Security Alert: Unusual activity detected. Verify your identity: http://phishing-site.net/secure",
    "Your payment failed. Update your credit card: http://fake-payment.com/update",
    "IRS Notice: You owe taxes. Pay immediately: http://fake-irs.gov/pay",
    "Your package delivery failed. Reschedule: http://fake-delivery.com/track",
    "Account locked for security. Unlock now: http://suspicious-site.com/unlock",
    "Limited time offer! 90% off. Shop now: http://fake-store.com/sale",
    "Your subscription expired. Renew now: http://fake-service.com/renew",
    "Verify your email address. Click here: http://phishing-link.com/verify",
    "Your password will expire. Change it now: http://fake-login.com/password",
    "Suspicious login detected. Secure your account: http://scam-site.com/secure",
    "Your order is ready. Track shipment: http://fake-shipping.com/track",
    "Your account needs verification. Verify now: http://phishing-site.com/verify",
    "You have unread messages. View now: http://fake-messages.com/view",
    "Your credit card was declined. Update payment: http://scam-payment.com/update",
    "Important: Action required on your account: http://fake-important.com/action",
    "Your account balance is low. Add funds: http://phishing-bank.com/add",
    "Security breach detected. Change password: http://fake-security.com/password",
    "Your subscription will end soon. Renew: http://scam-renewal.com/renew",
    "You have pending notifications. View: http://fake-notifications.com/view",
    "Your account is at risk. Secure it: http://phishing-secure.com/secure",
    "Payment confirmation required. Confirm: http://fake-payment.com/confirm",
    "Your order was cancelled. Review: http://scam-order.com/review",
    "Account verification needed. Verify: http://phishing-verify.com/verify",
    "Your password was changed. If not you, secure: http://fake-password.com/secure",
    "Your account has been flagged. Resolve: http://scam-flag.com/resolve",
    "Limited time: Special offer. Claim: http://fake-offer.com/claim",
    "Your account needs attention. Act now: http://phishing-attention.com/action",
];

/// Legitimate examples of the sample corpus.
pub const SAMPLE_LEGITIMATE: &[&str] = &[
    "Thank you for your subscription to our newsletter. Here are this month's updates and news.",
    "Your order #12345 has been shipped. You can track it using the link in your account.",
    "Meeting reminder: Team standup at 10 AM tomorrow in Conference Room B.",
    "Monthly report: Here's a summary of your account activity for the past month.",
    "Welcome to our service! We're excited to have you on board. Here's how to get started.",
    "Your payment of $29.99 was successfully processed. Receipt attached.",
    "Password reset request received. If you didn't request this, please ignore this email.",
    "Your account has been successfully created. Please verify your email address.",
    "Invoice #INV-2024-001 is ready for review. Please review and approve.",
    "Thank you for contacting support. We've received your inquiry and will respond within 24 hours.",
    "Your subscription will renew automatically on March 15, 2024. No action needed.",
    "New features available: Check out the latest updates to our platform.",
    "Your profile has been updated successfully. View your changes in your account settings.",
    "Weekly digest: Here's what happened this week in your workspace.",
    "Your document has been shared with john@example.com. They can now access it.",
    "System maintenance scheduled for Sunday, 2 AM - 4 AM. Service may be temporarily unavailable.",
    "Your request has been approved. You can now proceed with the next steps.",
    "Thank you for your feedback. We appreciate your input and will consider it for future improvements.",
    "Your account balance is $150.00. View your transaction history in your account.",
    "Security alert: A new device logged into your account. If this wasn't you, please secure your account.",
    "Your file upload was successful. You can now access it in your documents folder.",
    "Reminder: Your trial period ends in 3 days. Upgrade to continue using all features.",
    "Your form submission was received. We'll process it and get back to you soon.",
    "New comment on your post: 'Great work on the project!' View and respond in the app.",
    "Your scheduled task completed successfully. View results in your dashboard.",
    "Account summary: You have 5 active projects and 12 team members.",
    "Your download is ready. Click here to download your requested file.",
    "Event invitation: You're invited to the quarterly team meeting on Friday at 3 PM.",
    "Your application status: Under review. We'll notify you once a decision is made.",
    "Thank you for your purchase. Your order will arrive within 5-7 business days.",
];

/// The balanced 30 + 30 sample corpus, phishing examples first.
pub fn sample_corpus() -> Corpus {
    let phishing = SAMPLE_PHISHING
        .iter()
        .map(|text| LabeledDocument::new(*text, Label::Phishing));
    let legitimate = SAMPLE_LEGITIMATE
        .iter()
        .map(|text| LabeledDocument::new(*text, Label::Safe));
    phishing.chain(legitimate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_corpus_is_balanced() {
        let corpus = sample_corpus();
        assert_eq!(corpus.len(), 60);
        assert_eq!(corpus.class_counts(), [30, 30]);
        assert_eq!(corpus.documents()[0].label, Label::Phishing);
        assert_eq!(corpus.documents()[59].label, Label::Safe);
    }
}
