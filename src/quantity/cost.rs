quantity!(Cost, "¤");
quantity!(KilowattHourRate, "¤/kWh");
